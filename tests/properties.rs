mod common;

use common::*;
use graphwalk::coerce;
use graphwalk::{Context, Value};
use indexmap::IndexMap;
use proptest::prelude::*;

fn entries() -> impl Strategy<Value = IndexMap<String, Option<i64>>> {
    prop::collection::vec(("[a-z]{1,4}", prop::option::of(any::<i64>())), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn users_round_trip(
        id in any::<i64>(),
        name in prop::option::of("\\PC{0,12}"),
        tags in prop::collection::vec("[a-z0-9 ]{0,6}", 0..5),
    ) {
        let s = serializer();
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        let original = user(id, name.as_deref(), &tags);
        let text = s.serialize(&original, "json", None, None).unwrap();
        prop_assert_eq!(s.deserialize(&text, "User", "json", None).unwrap(), original);
    }

    #[test]
    fn omitting_nulls_drops_exactly_the_null_entries(map in entries()) {
        let s = serializer();
        let value = Value::Map(map.iter().map(|(k, v)| (k.clone(), Value::from(*v))).collect());
        let ty = Some("map<string,int>");

        let render = |pairs: Vec<(&String, String)>| {
            let body: Vec<String> = pairs.into_iter().map(|(k, v)| format!("\"{k}\":{v}")).collect();
            format!("{{{}}}", body.join(","))
        };
        let kept = map.iter().filter_map(|(k, v)| v.map(|v| (k, v.to_string()))).collect();
        let all = map
            .iter()
            .map(|(k, v)| (k, v.map_or_else(|| "null".to_string(), |v| v.to_string())))
            .collect();

        prop_assert_eq!(s.serialize(&value, "json", None, ty).unwrap(), render(kept));
        let include = Some(Context::serialization().with_serialize_null(true));
        prop_assert_eq!(s.serialize(&value, "json", include, ty).unwrap(), render(all));
    }

    #[test]
    fn int_lists_render_as_sequences(xs in prop::collection::vec(any::<i64>(), 0..10)) {
        let s = serializer();
        let expected = format!("[{}]", xs.iter().map(ToString::to_string).collect::<Vec<_>>().join(","));
        let value = Value::List(xs.into_iter().map(Value::Int).collect());
        prop_assert_eq!(s.serialize(&value, "json", None, Some("list<int>")).unwrap(), expected);
    }

    #[test]
    fn integer_strings_coerce_exactly(i in any::<i64>()) {
        let coerced = coerce::to_int(&Value::Str(i.to_string()));
        prop_assert!(!coerced.lossy);
        prop_assert_eq!(coerced.value, i);

        let back = serializer().deserialize(&format!("\"{i}\""), "int", "json", None).unwrap();
        prop_assert_eq!(back, Value::Int(i));
    }
}

#[test]
fn empty_collections_keep_their_shape() {
    let s = serializer();
    let empty_list = Value::List(vec![]);
    let empty_map = Value::Map(IndexMap::new());
    assert_eq!(s.serialize(&empty_list, "json", None, Some("list<int>")).unwrap(), "[]");
    assert_eq!(s.serialize(&empty_map, "json", None, Some("map<string,int>")).unwrap(), "{}");
    assert_eq!(s.serialize(&empty_list, "json", None, Some("map<string,int>")).unwrap(), "{}");
    assert_eq!(s.serialize(&empty_map, "json", None, None).unwrap(), "{}");
}
