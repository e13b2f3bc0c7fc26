use proptest::prelude::*;
use reportgrid_model::{cmp_columns, sort_columns, ColumnDefinition, EntityKind, EntityRef};
use std::cmp::Ordering;

fn arb_column() -> impl Strategy<Value = ColumnDefinition> {
    let kinds = prop_oneof![
        Just(EntityKind::Measurable),
        Just(EntityKind::AssessmentDefinition),
        Just(EntityKind::CostKind),
        Just(EntityKind::InvolvementKind),
    ];
    (kinds, 0i64..50, 0i32..5, "[A-Za-z]{0,4}").prop_map(|(kind, id, position, name)| {
        ColumnDefinition::new(EntityRef::named(kind, id, name), position)
    })
}

proptest! {
    #[test]
    fn sorted_columns_respect_position_then_name(mut columns in prop::collection::vec(arb_column(), 0..24)) {
        sort_columns(&mut columns);
        for pair in columns.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.position <= b.position);
            if a.position == b.position {
                prop_assert!(a.display_name() <= b.display_name());
            }
        }
    }

    #[test]
    fn ordering_is_independent_of_input_order(columns in prop::collection::vec(arb_column(), 0..24)) {
        let mut forward = columns.clone();
        let mut reversed: Vec<_> = columns.into_iter().rev().collect();
        sort_columns(&mut forward);
        sort_columns(&mut reversed);
        let keys = |cols: &[ColumnDefinition]| -> Vec<(i32, String)> {
            cols.iter().map(|c| (c.position, c.display_name().to_string())).collect()
        };
        prop_assert_eq!(keys(&forward), keys(&reversed));
    }

    #[test]
    fn comparator_is_antisymmetric(a in arb_column(), b in arb_column()) {
        prop_assert_eq!(cmp_columns(&a, &b), cmp_columns(&b, &a).reverse());
        if a.position != b.position {
            prop_assert_ne!(cmp_columns(&a, &b), Ordering::Equal);
        }
    }
}
