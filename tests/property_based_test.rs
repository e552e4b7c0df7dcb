//! Property-based tests using proptest
//!
//! Tests that verify parser invariants hold for arbitrary status contents.

use openvpn_exporter::error::ExporterError;
use openvpn_exporter::metrics::Measurement;
use openvpn_exporter::status::ServerParser;
use std::collections::BTreeSet;

const CLIENT_HEADER: &[&str] = &[
    "HEADER",
    "CLIENT_LIST",
    "Common Name",
    "Real Address",
    "Virtual Address",
    "Bytes Received",
    "Bytes Sent",
    "Connected Since (time_t)",
    "Username",
];
const ROUTE_HEADER: &[&str] = &[
    "HEADER",
    "ROUTING_TABLE",
    "Virtual Address",
    "Common Name",
    "Real Address",
    "Last Ref (time_t)",
];

/// A generated data row: client session or route
#[derive(Debug, Clone)]
enum Row {
    Client {
        name: String,
        received: u32,
        sent: u32,
    },
    Route {
        name: String,
        last_ref: u32,
    },
}

impl Row {
    fn fields(&self) -> Vec<String> {
        match self {
            Row::Client {
                name,
                received,
                sent,
            } => vec![
                "CLIENT_LIST".to_string(),
                name.clone(),
                "1.2.3.4:1194".to_string(),
                "10.8.0.2".to_string(),
                received.to_string(),
                sent.to_string(),
                "1600000000".to_string(),
                "UNDEF".to_string(),
            ],
            Row::Route { name, last_ref } => vec![
                "ROUTING_TABLE".to_string(),
                "10.8.0.2".to_string(),
                name.clone(),
                "1.2.3.4:1194".to_string(),
                last_ref.to_string(),
            ],
        }
    }
}

fn render(rows: &[Row], separator: &str) -> String {
    let mut lines = vec![
        format!("TITLE{separator}OpenVPN 2.4"),
        format!("TIME{separator}{separator}1600000100"),
        CLIENT_HEADER.join(separator),
        ROUTE_HEADER.join(separator),
    ];
    lines.extend(rows.iter().map(|row| row.fields().join(separator)));
    lines.push("END".to_string());
    lines.join("\n")
}

fn parse(input: &str, separator: char, ignore_individuals: bool) -> Vec<Measurement> {
    let mut measurements = Vec::new();
    ServerParser::new(ignore_individuals)
        .parse("vpn", input.as_bytes(), separator, &mut measurements)
        .expect("generated input must parse");
    measurements
}

fn connected_clients(measurements: &[Measurement]) -> f64 {
    measurements
        .iter()
        .find(|m| m.name() == "openvpn_server_connected_clients")
        .map(|m| m.value)
        .expect("client count missing")
}

mod strategies {
    use super::Row;
    use proptest::prelude::*;

    pub fn row() -> impl Strategy<Value = Row> {
        prop_oneof![
            ("[a-z][a-z0-9_.-]{0,12}", any::<u32>(), any::<u32>()).prop_map(
                |(name, received, sent)| Row::Client {
                    name,
                    received,
                    sent
                }
            ),
            ("[a-z][a-z0-9_.-]{0,12}", any::<u32>())
                .prop_map(|(name, last_ref)| Row::Route { name, last_ref }),
        ]
    }
}

use proptest::prelude::*;

proptest! {
    #[test]
    fn test_connected_clients_counts_client_rows(rows in prop::collection::vec(strategies::row(), 0..40)) {
        // Given: Client and route rows interleaved in any order
        let input = render(&rows, ",");

        // When: Parsing
        let measurements = parse(&input, ',', true);

        // Then: Only CLIENT_LIST rows are counted
        let expected = rows.iter().filter(|r| matches!(r, Row::Client { .. })).count();
        prop_assert_eq!(connected_clients(&measurements), expected as f64);
    }

    #[test]
    fn test_v2_and_v3_are_equivalent(rows in prop::collection::vec(strategies::row(), 0..20), detailed in any::<bool>()) {
        // Given: The same content comma and tab separated
        let v2 = render(&rows, ",");
        let v3 = render(&rows, "\t");

        // When: Parsing each with its separator
        let from_v2 = parse(&v2, ',', !detailed);
        let from_v3 = parse(&v3, '\t', !detailed);

        // Then: The measurements are identical
        prop_assert_eq!(from_v2, from_v3);
    }

    #[test]
    fn test_column_count_mismatch_always_fails(header_len in 1usize..10, row_len in 0usize..12) {
        prop_assume!(header_len != row_len);

        // Given: A header of one length and a row of another
        let header: Vec<String> = (0..header_len).map(|i| format!("column {i}")).collect();
        let row: Vec<String> = (0..row_len).map(|i| format!("value {i}")).collect();
        let mut input = format!("HEADER,CLIENT_LIST,{}\nCLIENT_LIST", header.join(","));
        if !row.is_empty() {
            input.push(',');
            input.push_str(&row.join(","));
        }

        // When: Parsing
        let mut measurements = Vec::new();
        let result = ServerParser::new(true).parse("vpn", input.as_bytes(), ',', &mut measurements);

        // Then: A column count mismatch is reported
        let is_mismatch = matches!(result, Err(ExporterError::ColumnCountMismatch { .. }));
        prop_assert!(is_mismatch);
    }

    #[test]
    fn test_row_before_header_always_fails(values in prop::collection::vec("[a-z0-9]{1,6}", 0..8), routing in any::<bool>()) {
        // Given: A data row with no header for its section
        let section = if routing { "ROUTING_TABLE" } else { "CLIENT_LIST" };
        let mut fields = vec![section.to_string()];
        fields.extend(values);
        let input = format!("TITLE,OpenVPN 2.4\n{}\nEND", fields.join(","));

        // When: Parsing
        let mut measurements = Vec::new();
        let result = ServerParser::new(true).parse("vpn", input.as_bytes(), ',', &mut measurements);

        // Then: The missing header is reported for that section
        let is_missing = matches!(result, Err(ExporterError::MissingHeader(ref s)) if s == section);
        prop_assert!(is_missing);
    }

    #[test]
    fn test_ignore_individuals_only_changes_labels(rows in prop::collection::vec(strategies::row(), 0..20)) {
        // Given: The same input
        let input = render(&rows, ",");

        // When: Parsing in aggregated and detailed mode
        let aggregated = parse(&input, ',', true);
        let detailed = parse(&input, ',', false);

        // Then: Metric identities, values and client count agree; only labels differ
        let names = |ms: &[Measurement]| ms.iter().map(|m| m.name()).collect::<BTreeSet<_>>();
        prop_assert_eq!(names(&aggregated), names(&detailed));
        prop_assert_eq!(aggregated.len(), detailed.len());
        for (a, d) in aggregated.iter().zip(&detailed) {
            prop_assert_eq!(a.name(), d.name());
            prop_assert_eq!(a.value, d.value);
            prop_assert!(a.labels.len() <= d.labels.len());
            prop_assert_eq!(a.labels.len(), a.desc.labels.len());
            prop_assert_eq!(d.labels.len(), d.desc.labels.len());
        }
        prop_assert_eq!(connected_clients(&aggregated), connected_clients(&detailed));
    }
}
