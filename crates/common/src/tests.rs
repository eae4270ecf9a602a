use super::*;
use pretty_assertions::assert_eq;
use types::values;

#[test]
fn config_defaults_are_sane() {
    let cfg = Config::default();
    assert!(cfg.ordered);
    assert_eq!(cfg.match_mode, MatchMode::Pattern);
    assert!(!cfg.close_expectations);
    assert!(cfg.call_timeout.is_none());
}

#[test]
fn builder_defaults_agree_with_default() {
    let built = Config::builder().build();
    let default = Config::default();
    assert_eq!(built.ordered, default.ordered);
    assert_eq!(built.match_mode, default.match_mode);
    assert_eq!(built.close_expectations, default.close_expectations);
    assert_eq!(built.call_timeout, default.call_timeout);
}

#[test]
fn db_error_formats_cleanly() {
    let err = DbError::Configuration("bad pattern".into());
    assert!(format!("{err}").contains("configuration"));

    let err = DbError::OrderViolation {
        call: "Commit".into(),
        next: "Exec 'UPDATE products'".into(),
    };
    assert!(err.to_string().contains("next expectation is Exec"));
}

#[test]
fn injected_error_displays_only_its_message() {
    let err = DbError::injected("some error");
    assert_eq!(err.to_string(), "some error");
    assert!(err.is_injected());
    assert!(!err.is_unexpected_call());
}

#[test]
fn unmet_lists_every_pending_entry() {
    let err = DbError::UnmetExpectations(vec!["#2 Commit".into()]);
    assert_eq!(
        err.to_string(),
        "there are 1 unfulfilled expectations:\n#2 Commit"
    );
    assert_eq!(err.unmet(), Some(&["#2 Commit".to_string()][..]));
}

#[test]
fn row_scans_into_tuple() {
    let row = Row::new(values![1, "Foobar", true]);
    let (id, name, searchable): (i64, String, bool) = row.scan().unwrap();
    assert_eq!(id, 1);
    assert_eq!(name, "Foobar");
    assert!(searchable);
}

#[test]
fn scan_arity_mismatch_is_an_error() {
    let row = Row::new(values![1, 2]);
    let err = row.scan::<(i64,)>().unwrap_err();
    assert!(matches!(err, DbError::Scan(_)));
}

#[test]
fn get_reports_type_mismatch() {
    let row = Row::new(values!["x"]);
    let err = row.get::<i64>(0).unwrap_err();
    assert!(err.to_string().contains("TEXT"));
    assert!(row.get::<i64>(5).is_err());
}
