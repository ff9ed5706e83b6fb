//! Property-based tests for appstat using proptest

use appstat::aggregation::{Aggregator, rate, value_counts};
use appstat::aggregation_types::ConversionBasis;
use appstat::types::{Dataset, Session, Table, User, UserId};
use appstat_loader::page_list;
use proptest::prelude::*;
use std::collections::HashSet;

// Strategies for generating test data

fn arb_status() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("active".to_string())),
        Just(Some("inactive".to_string())),
        Just(Some("banned".to_string())),
    ]
}

prop_compose! {
    fn arb_users(max: usize)(statuses in prop::collection::vec(arb_status(), 0..max)) -> Vec<User> {
        statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| User {
                uid: UserId::new(format!("u{i}")),
                status,
                ..Default::default()
            })
            .collect()
    }
}

prop_compose! {
    fn arb_session()(
        user in 0usize..12,
        duration in prop::option::of(0.0f64..10_000.0),
        pages in prop::collection::vec("[a-e]", 0..6),
    ) -> Session {
        Session {
            uid: UserId::new(format!("u{user}")),
            duration_seconds: duration,
            visited_pages: pages,
            ..Default::default()
        }
    }
}

fn dataset(users: Vec<User>, sessions: Vec<Session>) -> Dataset {
    Dataset {
        users: Table::with_all_columns(users),
        sessions: Table::with_all_columns(sessions),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn active_users_never_exceed_total(users in arb_users(40)) {
        let data = dataset(users, Vec::new());
        let agg = Aggregator::new(&data);
        prop_assert!(agg.active_users() <= agg.total_users());
    }

    #[test]
    fn rates_are_finite_and_non_negative(
        users in arb_users(20),
        sessions in prop::collection::vec(arb_session(), 0..30),
        signups in 0usize..50,
    ) {
        let data = dataset(users, sessions);
        let agg = Aggregator::new(&data);

        let values = [
            agg.retention_rate(),
            agg.conversion_rate(ConversionBasis::Sessions, signups),
            agg.conversion_rate(ConversionBasis::Transactions, signups),
            agg.pages_per_session(),
            agg.avg_session_duration_minutes(),
            agg.avg_sessions_per_user(),
        ];
        for value in values {
            prop_assert!(value.is_finite());
            prop_assert!(value >= 0.0);
        }

        if data.users.is_empty() {
            prop_assert_eq!(agg.retention_rate(), 0.0);
        }
        if signups == 0 {
            prop_assert_eq!(agg.conversion_rate(ConversionBasis::Sessions, 0), 0.0);
        }
        if data.sessions.is_empty() {
            prop_assert_eq!(agg.avg_session_duration_minutes(), 0.0);
            prop_assert_eq!(agg.active_users_metrics().dau, 0.0);
        }
    }

    #[test]
    fn rate_is_zero_without_denominator(numerator in 0usize..1_000) {
        prop_assert_eq!(rate(numerator, 0), 0.0);
    }

    #[test]
    fn frequency_segments_partition_active_users(
        sessions in prop::collection::vec(arb_session(), 0..60),
    ) {
        let distinct: HashSet<&str> = sessions.iter().map(|s| s.uid.as_str()).collect();
        let expected = distinct.len();

        let data = dataset(Vec::new(), sessions);
        let segments = Aggregator::new(&data).frequency_segments();
        prop_assert_eq!(segments.total(), expected);
    }

    #[test]
    fn page_ranking_is_sorted_and_stable(
        sessions in prop::collection::vec(arb_session(), 0..30),
    ) {
        let flattened: Vec<String> = sessions
            .iter()
            .flat_map(|s| s.visited_pages.iter().cloned())
            .collect();
        let data = dataset(Vec::new(), sessions);
        let ranking = Aggregator::new(&data).most_visited_pages();

        prop_assert_eq!(ranking.iter().map(|r| r.count).sum::<usize>(), flattened.len());
        for pair in ranking.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
            if pair[0].count == pair[1].count {
                let first = flattened.iter().position(|p| *p == pair[0].label);
                let second = flattened.iter().position(|p| *p == pair[1].label);
                prop_assert!(first < second);
            }
        }
    }

    #[test]
    fn value_counts_match_naive_counts(values in prop::collection::vec("[a-d]", 0..40)) {
        for row in value_counts(&values) {
            let naive = values.iter().filter(|v| **v == row.label).count();
            prop_assert_eq!(row.count, naive);
        }
    }

    #[test]
    fn page_list_round_trip(pages in prop::collection::vec("[a-zA-Z0-9_/' ,\\\\-]{0,12}", 0..8)) {
        let literal = page_list::encode(&pages);
        prop_assert_eq!(page_list::decode(&literal).unwrap(), pages);
    }
}
