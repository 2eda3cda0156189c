use proptest::prelude::*;
use scriptpilot::session::{Conversation, Role, Turn};
use scriptpilot::usage::Cost;

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::System),
        Just(Role::User),
        Just(Role::Assistant),
        Just(Role::Observation),
    ]
}

proptest! {
    #[test]
    fn appended_turns_are_never_lost_or_reordered(
        appends in proptest::collection::vec((role_strategy(), ".{0,40}", 0i64..5_000), 0..60)
    ) {
        let mut conversation = Conversation::new("mock/model");
        let mut expected: Vec<Turn> = Vec::new();
        let mut expected_cost = Cost::ZERO;

        for (role, content, micros) in appends {
            let snapshot = conversation.turns().to_vec();
            let turn = Turn::new(role, content);
            let index = conversation.append(turn.clone());
            conversation.add_cost(Cost::from_micros(micros));
            expected.push(turn);
            expected_cost = expected_cost.saturating_add(Cost::from_micros(micros));

            // Everything that was there before is still there, unchanged.
            prop_assert_eq!(index, snapshot.len());
            prop_assert_eq!(&conversation.turns()[..snapshot.len()], snapshot.as_slice());
        }

        prop_assert_eq!(conversation.turns(), expected.as_slice());
        prop_assert_eq!(conversation.metadata().cumulative_cost, expected_cost);
    }
}
