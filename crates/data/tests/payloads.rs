use chrono::NaiveDate;
use inkdeck_core::Format;
use inkdeck_data::candidate_from_payload;
use serde_json::json;

macro_rules! ink_case {
    ($name:ident, $inks:expr, $label:expr) => {
        #[test]
        fn $name() {
            let card = candidate_from_payload(&json!({"name": "Card", "ink": $inks}))
                .expect("candidate");
            assert_eq!(card.ink_label(), $label);
        }
    };
}

ink_case!(ink_single, "Ruby", "Ruby");
ink_case!(ink_lowercase, "sapphire", "Sapphire");
ink_case!(ink_slash_pair, "Steel/Amber", "Amber/Steel");
ink_case!(ink_comma_pair, "Emerald, Amethyst", "Amethyst/Emerald");
ink_case!(ink_semicolon_pair, "Ruby;Sapphire", "Ruby/Sapphire");
ink_case!(ink_array_pair, ["Steel", "Ruby"], "Ruby/Steel");
ink_case!(ink_repeated, ["Amber", "amber"], "Amber");

macro_rules! cost_case {
    ($name:ident, $cost:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let payload = json!({"name": "Card", "ink": "Amber", "cost": $cost});
            let card = candidate_from_payload(&payload).expect("candidate");
            assert_eq!(card.cost, $expected);
        }
    };
}

cost_case!(cost_number, 3, Some(3));
cost_case!(cost_zero, 0, Some(0));
cost_case!(cost_string, "7", Some(7));
cost_case!(cost_padded_string, " 2 ", Some(2));
cost_case!(cost_negative, -1, None);
cost_case!(cost_text, "X", None);
cost_case!(cost_null, serde_json::Value::Null, None);

macro_rules! inkable_case {
    ($name:ident, $value:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let payload = json!({"name": "Card", "ink": "Amber", "inkable": $value});
            let card = candidate_from_payload(&payload).expect("candidate");
            assert_eq!(card.inkable, $expected);
        }
    };
}

inkable_case!(inkable_true, true, true);
inkable_case!(inkable_false, false, false);
inkable_case!(inkable_one, 1, true);
inkable_case!(inkable_zero, 0, false);
inkable_case!(inkable_yes, "yes", true);
inkable_case!(inkable_word, "Inkable", true);
inkable_case!(inkable_uninkable, "uninkable", false);
inkable_case!(inkable_garbage, "maybe", false);

macro_rules! legality_case {
    ($name:ident, $legality:expr, $core:expr, $infinity:expr) => {
        #[test]
        fn $name() {
            let mut payload = json!({"name": "Hook", "ink": "Ruby", "cost": 3});
            payload["formats"] = $legality;
            let card = candidate_from_payload(&payload).expect("candidate");
            let on = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");
            assert_eq!(card.is_legal_in(Format::Core, on), $core);
            assert_eq!(card.is_legal_in(Format::Infinity, on), $infinity);
        }
    };
}

legality_case!(legality_name_list, json!(["core", "infinity"]), true, true);
legality_case!(legality_name_list_infinity_only, json!(["Infinity"]), false, true);
legality_case!(legality_name_string, json!("core, infinity"), true, true);
legality_case!(legality_unknown_names_only, json!(["vintage"]), false, false);
legality_case!(legality_empty_list, json!([]), false, false);
legality_case!(legality_null, serde_json::Value::Null, true, true);
legality_case!(
    legality_all_banned,
    json!({"core": false, "infinity": "banned"}),
    false,
    false
);
legality_case!(
    legality_rotated_out,
    json!({"core": {"until": "2025-01-01"}, "infinity": "legal"}),
    false,
    true
);
legality_case!(
    legality_window_list,
    json!([{"format": "core", "from": "2024-01-01"}, {"name": "infinity", "until": "2024-01-01"}]),
    true,
    false
);

macro_rules! reject_case {
    ($name:ident, $payload:expr) => {
        #[test]
        fn $name() {
            assert!(candidate_from_payload(&$payload).is_err());
        }
    };
}

reject_case!(reject_missing_name, json!({"ink": "Ruby"}));
reject_case!(reject_blank_name, json!({"name": "  ", "ink": "Ruby"}));
reject_case!(reject_missing_ink, json!({"name": "Card"}));
reject_case!(reject_unknown_ink, json!({"name": "Card", "ink": "Purple"}));
reject_case!(
    reject_bad_date,
    json!({"name": "Card", "ink": "Ruby", "legality": {"core": {"from": "soon"}}})
);
reject_case!(
    reject_numeric_legality_entry,
    json!({"name": "Card", "ink": "Ruby", "formats": ["core", 7]})
);
reject_case!(reject_scalar, json!("Card"));
