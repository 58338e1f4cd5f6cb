use inkdeck_core::{parse_identity_reply, parse_name_list, AgentAction, Ink};

macro_rules! identity_case {
    ($name:ident, $reply:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let parsed = parse_identity_reply($reply)
                .ok()
                .map(|identity| identity.inks().to_vec());
            assert_eq!(parsed, $expected);
        }
    };
}

identity_case!(
    identity_plain,
    r#"{"inks": ["Ruby", "Steel"]}"#,
    Some(vec![Ink::Ruby, Ink::Steel])
);
identity_case!(
    identity_reordered,
    r#"{"inks": ["Steel", "Amber"]}"#,
    Some(vec![Ink::Amber, Ink::Steel])
);
identity_case!(
    identity_colors_alias,
    r#"{"colors": ["emerald", "SAPPHIRE"]}"#,
    Some(vec![Ink::Emerald, Ink::Sapphire])
);
identity_case!(
    identity_prose,
    "I suggest {\"Inks\": [\"Amethyst\", \"Ruby\"]} because pirates.",
    Some(vec![Ink::Amethyst, Ink::Ruby])
);
identity_case!(
    identity_fenced,
    "```json\n{\"inks\": [\"Amber\", \"Emerald\"]}\n```",
    Some(vec![Ink::Amber, Ink::Emerald])
);
identity_case!(identity_one_ink, r#"{"inks": ["Ruby"]}"#, None);
identity_case!(identity_three_inks, r#"{"inks": ["Ruby", "Steel", "Amber"]}"#, None);
identity_case!(identity_duplicate, r#"{"inks": ["Ruby", "ruby"]}"#, None);
identity_case!(identity_unknown, r#"{"inks": ["Ruby", "Purple"]}"#, None);
identity_case!(identity_no_json, "Ruby and Steel", None);
identity_case!(identity_truncated, r#"{"inks": ["Ruby", "Steel""#, None);
identity_case!(identity_wrong_key, r#"{"decks": ["Ruby", "Steel"]}"#, None);

macro_rules! names_case {
    ($name:ident, $reply:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let expected: Option<Vec<&str>> = $expected;
            let parsed = parse_name_list($reply).ok();
            assert_eq!(
                parsed,
                expected.map(|names| names.iter().map(|name| name.to_string()).collect())
            );
        }
    };
}

names_case!(names_array, r#"["Hook", "Smee"]"#, Some(vec!["Hook", "Smee"]));
names_case!(
    names_in_prose,
    "Try these: [\"Hook\", \" Smee \"] for sure",
    Some(vec!["Hook", "Smee"])
);
names_case!(
    names_after_bracketed_word,
    r#"My [top] picks: ["Hook", "Smee"]"#,
    Some(vec!["Hook", "Smee"])
);
names_case!(names_after_number_list, r#"Step [1]: {"names": ["Hook"]}"#, Some(vec!["Hook"]));
names_case!(
    names_objects,
    r#"[{"name": "Hook"}, {"Name": "Smee"}, 3]"#,
    Some(vec!["Hook", "Smee"])
);
names_case!(names_cards_field, r#"{"cards": ["Hook"]}"#, Some(vec!["Hook"]));
names_case!(names_empty_array, "[]", None);
names_case!(names_nothing, "no idea", None);

macro_rules! action_case {
    ($name:ident, $reply:expr, $expected:expr) => {
        #[test]
        fn $name() {
            assert_eq!(AgentAction::parse($reply).ok(), $expected);
        }
    };
}

action_case!(
    action_search,
    r#"{"action": "search", "query": "pirates"}"#,
    Some(AgentAction::Search {
        query: "pirates".to_string()
    })
);
action_case!(action_search_blank, r#"{"action": "search", "query": "  "}"#, None);
action_case!(
    action_add,
    r#"{"action": "add-cards", "cards": [{"name": "Hook", "count": 2}]}"#,
    Some(AgentAction::AddCards {
        cards: vec![("Hook".to_string(), 2)]
    })
);
action_case!(
    action_add_default_count,
    r#"{"Action": "ADD", "items": [{"name": "Hook"}]}"#,
    Some(AgentAction::AddCards {
        cards: vec![("Hook".to_string(), 1)]
    })
);
action_case!(action_add_bad_item, r#"{"action": "add_cards", "cards": ["Hook"]}"#, None);
action_case!(action_finalize, r#"{"action": "finalize"}"#, Some(AgentAction::Finalize));
action_case!(action_done, "ok! {\"type\": \"done\"}", Some(AgentAction::Finalize));
action_case!(action_unknown, r#"{"action": "shuffle"}"#, None);
action_case!(action_missing, r#"{"query": "pirates"}"#, None);
