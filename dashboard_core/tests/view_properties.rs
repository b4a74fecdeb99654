use dashboard_core::{
    derive_visible_list, toggle_hidden, toggle_tracked, update_sort, CategoryFilter, SortField,
    SortOrder, TokenRecord, ViewState,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;
use std::collections::HashSet;

const NAMES: &[&str] = &["Alpha", "alpine", "Beta", "Hedera", "HBAR Wrapped", "Gamma"];
const SEARCHES: &[&str] = &["", "al", "ALP", "b", "he", "zz"];

fn token(index: usize, name: &str, price: i64, change: i64, market_cap: i64, tracked: bool, hidden: bool) -> TokenRecord {
    TokenRecord {
        id: format!("t{}", index),
        name: name.to_string(),
        symbol: name.chars().take(3).collect::<String>().to_uppercase(),
        price: Decimal::new(price, 2),
        price_change_24h: Decimal::new(change, 1),
        market_cap: Decimal::from(market_cap),
        volume_24h: Decimal::ZERO,
        image_url: String::new(),
        is_tracked: tracked,
        is_hidden: hidden,
        social_links: Default::default(),
        website: String::new(),
    }
}

fn tokens_strategy() -> impl Strategy<Value = Vec<TokenRecord>> {
    prop::collection::vec(
        (
            0..NAMES.len(),
            0i64..5,
            -30i64..30,
            0i64..4,
            any::<bool>(),
            any::<bool>(),
        ),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, price, change, cap, tracked, hidden))| {
                token(i, NAMES[name], price, change, cap, tracked, hidden)
            })
            .collect()
    })
}

fn sort_field_strategy() -> impl Strategy<Value = SortField> {
    prop_oneof![
        Just(SortField::Name),
        Just(SortField::Price),
        Just(SortField::MarketCap),
        Just(SortField::PriceChange24h),
    ]
}

fn view_strategy() -> impl Strategy<Value = ViewState> {
    (
        0..SEARCHES.len(),
        sort_field_strategy(),
        prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)],
        prop_oneof![
            Just(CategoryFilter::All),
            Just(CategoryFilter::Tracked),
            Just(CategoryFilter::Untracked),
        ],
        any::<bool>(),
    )
        .prop_map(|(search, sort_field, sort_order, category_filter, show_hidden)| ViewState {
            search_text: SEARCHES[search].to_string(),
            sort_field,
            sort_order,
            category_filter,
            show_hidden,
        })
}

fn id_set(list: &[&TokenRecord]) -> HashSet<String> {
    list.iter().map(|t| t.id.clone()).collect()
}

fn input_index(tokens: &[TokenRecord], id: &str) -> usize {
    tokens.iter().position(|t| t.id == id).unwrap()
}

proptest! {
    #[test]
    fn hidden_tokens_never_listed_unless_requested(tokens in tokens_strategy(), mut view in view_strategy()) {
        view.show_hidden = false;
        let visible = derive_visible_list(&tokens, &view);
        prop_assert!(visible.iter().all(|t| !t.is_hidden));
    }

    #[test]
    fn show_hidden_is_a_superset(tokens in tokens_strategy(), view in view_strategy()) {
        let without = ViewState { show_hidden: false, ..view.clone() };
        let with = ViewState { show_hidden: true, ..view };
        let without_ids = id_set(&derive_visible_list(&tokens, &without));
        let with_ids = id_set(&derive_visible_list(&tokens, &with));
        prop_assert!(without_ids.is_subset(&with_ids));
    }

    #[test]
    fn search_matches_name_or_symbol(tokens in tokens_strategy(), view in view_strategy()) {
        let needle = view.search_text.to_lowercase();
        for t in derive_visible_list(&tokens, &view) {
            prop_assert!(
                needle.is_empty()
                    || t.name.to_lowercase().contains(&needle)
                    || t.symbol.to_lowercase().contains(&needle)
            );
        }
    }

    #[test]
    fn tracked_and_untracked_partition_all(tokens in tokens_strategy(), view in view_strategy()) {
        let all = ViewState { category_filter: CategoryFilter::All, ..view.clone() };
        let tracked = ViewState { category_filter: CategoryFilter::Tracked, ..view.clone() };
        let untracked = ViewState { category_filter: CategoryFilter::Untracked, ..view };

        let all_list = derive_visible_list(&tokens, &all);
        let tracked_list = derive_visible_list(&tokens, &tracked);
        let untracked_list = derive_visible_list(&tokens, &untracked);

        prop_assert!(tracked_list.iter().all(|t| t.is_tracked));
        prop_assert!(untracked_list.iter().all(|t| !t.is_tracked));

        let tracked_ids = id_set(&tracked_list);
        let untracked_ids = id_set(&untracked_list);
        prop_assert!(tracked_ids.is_disjoint(&untracked_ids));

        let union: HashSet<String> = tracked_ids.union(&untracked_ids).cloned().collect();
        prop_assert_eq!(union, id_set(&all_list));
        prop_assert_eq!(tracked_list.len() + untracked_list.len(), all_list.len());
    }

    #[test]
    fn output_is_ordered_and_stable(tokens in tokens_strategy(), view in view_strategy()) {
        let visible = derive_visible_list(&tokens, &view);
        for pair in visible.windows(2) {
            let ordering = view.sort_field.compare(pair[0], pair[1]);
            match view.sort_order {
                SortOrder::Ascending => prop_assert_ne!(ordering, Ordering::Greater),
                SortOrder::Descending => prop_assert_ne!(ordering, Ordering::Less),
            }
            if ordering == Ordering::Equal {
                prop_assert!(input_index(&tokens, &pair[0].id) < input_index(&tokens, &pair[1].id));
            }
        }
    }

    #[test]
    fn update_sort_twice_restores_order(view in view_strategy(), field in sort_field_strategy()) {
        let once = update_sort(&view, field);
        let twice = update_sort(&once, field);
        prop_assert_eq!(twice.sort_field, field);
        prop_assert_eq!(once.sort_order.flipped(), twice.sort_order);
        if view.sort_field == field {
            prop_assert_eq!(twice, view);
        }
    }

    #[test]
    fn double_toggle_is_identity(tokens in tokens_strategy(), pick in 0usize..30) {
        let id = format!("t{}", pick);
        prop_assert_eq!(toggle_tracked(&toggle_tracked(&tokens, &id), &id), tokens.clone());
        prop_assert_eq!(toggle_hidden(&toggle_hidden(&tokens, &id), &id), tokens);
    }
}

fn scenario_tokens() -> Vec<TokenRecord> {
    let mut a = token(0, "Alpha", 1, 0, 100, false, false);
    a.id = "a".to_string();
    let mut b = token(1, "Beta", 1, 0, 200, true, true);
    b.id = "b".to_string();
    vec![a, b]
}

fn scenario_view() -> ViewState {
    ViewState {
        search_text: String::new(),
        sort_field: SortField::MarketCap,
        sort_order: SortOrder::Descending,
        category_filter: CategoryFilter::All,
        show_hidden: false,
    }
}

fn ids(list: Vec<&TokenRecord>) -> Vec<&str> {
    list.into_iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn scenario_hidden_token_excluded() {
    let tokens = scenario_tokens();
    assert_eq!(ids(derive_visible_list(&tokens, &scenario_view())), vec!["a"]);
}

#[test]
fn scenario_show_hidden_orders_by_market_cap() {
    let tokens = scenario_tokens();
    let view = ViewState { show_hidden: true, ..scenario_view() };
    assert_eq!(ids(derive_visible_list(&tokens, &view)), vec!["b", "a"]);
}

#[test]
fn scenario_tracked_only() {
    let tokens = scenario_tokens();
    let view = ViewState {
        show_hidden: true,
        category_filter: CategoryFilter::Tracked,
        ..scenario_view()
    };
    assert_eq!(ids(derive_visible_list(&tokens, &view)), vec!["b"]);
}

#[test]
fn scenario_search_alp() {
    let tokens = scenario_tokens();
    let view = ViewState {
        search_text: "alp".to_string(),
        show_hidden: true,
        ..scenario_view()
    };
    assert_eq!(ids(derive_visible_list(&tokens, &view)), vec!["a"]);
}

#[test]
fn scenario_stable_price_ties_in_both_directions() {
    let tokens = vec![
        token(0, "Alpha", 5, 0, 1, false, false),
        token(1, "Beta", 7, 0, 1, false, false),
        token(2, "Gamma", 5, 0, 1, false, false),
    ];
    let asc = ViewState {
        sort_field: SortField::Price,
        sort_order: SortOrder::Ascending,
        ..scenario_view()
    };
    let desc = ViewState { sort_order: SortOrder::Descending, ..asc.clone() };

    assert_eq!(ids(derive_visible_list(&tokens, &asc)), vec!["t0", "t2", "t1"]);
    assert_eq!(ids(derive_visible_list(&tokens, &desc)), vec!["t1", "t0", "t2"]);
    assert_eq!(tokens[0].price, dec!(0.05));
}
