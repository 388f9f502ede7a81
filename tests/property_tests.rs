use booking_wizard::core::totals::{format_duration, total_duration, total_price};
use booking_wizard::core::wizard::{reduce, Step, WizardAction, WizardLimits, WizardState};
use booking_wizard::domain::model::{client_label, AddOn, ClientId};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
enum Op {
    Add,
    Remove(usize),
    Activate(usize),
    RemoveUnknown,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        3 => (0usize..8).prop_map(Op::Remove),
        2 => (0usize..8).prop_map(Op::Activate),
        1 => Just(Op::RemoveUnknown),
    ]
}

fn action_for(state: &WizardState, op: &Op) -> WizardAction {
    let pick = |i: usize| state.clients[i % state.clients.len()].id;
    match op {
        Op::Add => WizardAction::AddClient,
        Op::Remove(i) => WizardAction::RemoveClient(pick(*i)),
        Op::Activate(i) => WizardAction::SetActiveClient(pick(*i)),
        Op::RemoveUnknown => WizardAction::RemoveClient(ClientId::generate()),
    }
}

fn add_on(id: &str, price: i64, duration: u32) -> AddOn {
    AddOn {
        id: id.to_string(),
        name: format!("Add-on {}", id),
        description: String::new(),
        duration,
        price: Decimal::from(price),
    }
}

proptest! {
    #[test]
    fn labels_stay_contiguous_and_active_is_valid(
        ops in prop::collection::vec(op_strategy(), 0..40),
        max in prop::option::of(1usize..6),
    ) {
        let limits = WizardLimits { max_clients: max };
        let mut state = WizardState::new();

        for op in &ops {
            let action = action_for(&state, op);
            let before = state.clone();
            let transition = reduce(&mut state, action, &limits);
            if !transition.is_applied() {
                prop_assert_eq!(&state, &before);
            }

            prop_assert!(!state.clients.is_empty());
            if let Some(max) = max {
                prop_assert!(state.clients.len() <= max);
            }
            for (i, client) in state.clients.iter().enumerate() {
                prop_assert_eq!(&client.label, &client_label(i + 1));
            }
            prop_assert!(state.client(state.active_client_id).is_some());
        }
    }

    #[test]
    fn toggling_twice_restores_add_ons(
        ids in prop::collection::vec("[a-z]{1,4}", 1..6),
    ) {
        let limits = WizardLimits::default();
        let mut state = WizardState::new();
        let client_id = state.active_client_id;

        for id in &ids {
            reduce(&mut state, WizardAction::ToggleAddOn { client_id, add_on: add_on(id, 10, 5) }, &limits);
        }
        let after_first = state.clone();
        for id in &ids {
            reduce(&mut state, WizardAction::ToggleAddOn { client_id, add_on: add_on(id, 10, 5) }, &limits);
        }
        for id in &ids {
            reduce(&mut state, WizardAction::ToggleAddOn { client_id, add_on: add_on(id, 10, 5) }, &limits);
        }

        let ids_of = |s: &WizardState| {
            let mut ids: Vec<String> = s.clients[0].add_ons.iter().map(|a| a.id.clone()).collect();
            ids.sort();
            ids
        };
        prop_assert_eq!(ids_of(&state), ids_of(&after_first));
        // 同一個 id 最多出現一次
        let mut unique = ids_of(&state);
        unique.dedup();
        prop_assert_eq!(unique.len(), state.clients[0].add_ons.len());
    }

    #[test]
    fn totals_are_sums_plus_one_fee(
        prices in prop::collection::vec((0i64..500, 0u32..180), 0..6),
        fee_cents in 0i64..1000,
    ) {
        let limits = WizardLimits::default();
        let mut state = WizardState::new();
        let client_id = state.active_client_id;
        for (i, (price, duration)) in prices.iter().enumerate() {
            reduce(
                &mut state,
                WizardAction::ToggleAddOn { client_id, add_on: add_on(&i.to_string(), *price, *duration) },
                &limits,
            );
        }

        let fee = Decimal::new(fee_cents, 2);
        let expected_price: i64 = prices.iter().map(|(p, _)| p).sum();
        let expected_minutes: u32 = prices.iter().map(|(_, d)| d).sum();

        prop_assert_eq!(total_price(&state.clients, fee), Decimal::from(expected_price) + fee);
        prop_assert_eq!(total_duration(&state.clients), expected_minutes);
    }

    #[test]
    fn reset_always_returns_initial_shape(
        ops in prop::collection::vec(op_strategy(), 0..20),
        step in 0usize..Step::COUNT,
    ) {
        let limits = WizardLimits { max_clients: None };
        let mut state = WizardState::new();
        for op in &ops {
            let action = action_for(&state, op);
            reduce(&mut state, action, &limits);
        }
        if let Some(step) = Step::from_index(step) {
            reduce(&mut state, WizardAction::SetStep(step), &limits);
        }

        reduce(&mut state, WizardAction::Reset, &limits);
        prop_assert_eq!(state.current_step, Step::Services);
        prop_assert_eq!(state.clients.len(), 1);
        prop_assert_eq!(state.active_client_id, state.clients[0].id);
        prop_assert_eq!(&state.clients[0].label, &client_label(1));
        prop_assert!(state.selected_date.is_none());
        prop_assert!(!state.is_confirmed);
    }

    #[test]
    fn format_duration_round_trips_minutes(minutes in 0u32..2000) {
        let text = format_duration(minutes);
        let mut total = 0;
        for part in text.split_whitespace() {
            if let Some(h) = part.strip_suffix('h') {
                total += h.parse::<u32>().unwrap() * 60;
            } else if let Some(m) = part.strip_suffix('m') {
                total += m.parse::<u32>().unwrap();
            }
        }
        prop_assert_eq!(total, minutes);
    }
}
