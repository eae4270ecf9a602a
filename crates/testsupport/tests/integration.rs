//! End-to-end scenarios: application routines run against a mock connection.

use anyhow::Result;
use pretty_assertions::assert_eq;
use testsupport::prelude::*;

fn declare_stats_prologue(mock: &Mock) -> DbResult<()> {
    mock.expect_begin().declare()?;
    mock.expect_exec("UPDATE products")
        .will_return_result(1, 1)
        .declare()?;
    Ok(())
}

#[test]
fn should_update_stats() -> Result<()> {
    let ctx = MockContext::new();
    let mock = ctx.mock();
    declare_stats_prologue(mock)?;
    mock.expect_exec("INSERT INTO product_viewers")
        .with_args(args![2, 3])
        .will_return_result(1, 1)
        .declare()?;
    mock.expect_commit().declare()?;

    record_stats(ctx.conn(), 2, 3)?;

    ctx.verify()?;
    Ok(())
}

#[test]
fn should_rollback_stat_updates_on_failure() -> Result<()> {
    let ctx = MockContext::new();
    let mock = ctx.mock();
    declare_stats_prologue(mock)?;
    mock.expect_exec("INSERT INTO product_viewers")
        .with_args(args![2, 3])
        .will_return_error(some_error())
        .declare()?;
    mock.expect_rollback().declare()?;

    let result = record_stats(ctx.conn(), 2, 3);
    assert_error_contains(result, "some error");
    assert!(!ctx.conn().in_transaction());

    ctx.verify()?;
    Ok(())
}

#[test]
fn commit_declared_but_routine_fails_leaves_commit_unmet() {
    let ctx = MockContext::new();
    let mock = ctx.mock();
    declare_stats_prologue(mock).unwrap();
    mock.expect_exec("INSERT INTO product_viewers")
        .with_args(args![2, 3])
        .will_return_error(some_error())
        .declare()
        .unwrap();
    mock.expect_commit().declare().unwrap();

    // The rollback the routine attempts is out of declared order; the
    // statement's own error still reaches the caller.
    let err = record_stats(ctx.conn(), 2, 3).unwrap_err();
    assert_eq!(err, some_error());
    assert!(ctx.conn().in_transaction());
    assert_unmet(mock, &["#4 Commit"]);
}

#[test]
fn wrong_arguments_are_rejected_at_call_time() {
    let ctx = MockContext::new();
    let mock = ctx.mock();
    declare_stats_prologue(mock).unwrap();
    mock.expect_exec("INSERT INTO product_viewers")
        .with_args(args![2, 3])
        .will_return_result(1, 1)
        .declare()
        .unwrap();
    mock.expect_rollback().declare().unwrap();

    let err = record_stats(ctx.conn(), 9, 3).unwrap_err();
    assert!(err.is_order_violation());
    assert!(err.to_string().contains("with args [9, 3]"));
    // Neither the mismatched insert nor the rollback behind it was consumed.
    assert_unmet(
        mock,
        &[
            "#3 Exec \"INSERT INTO product_viewers\" with args [2, 3]",
            "#4 Rollback",
        ],
    );
}

#[test]
fn get_provider_by_name_scans_one_row() -> Result<()> {
    let ctx = MockContext::new();
    let rows = RowSet::new(["id", "name", "searchable"]).add_row(values![1, "Foobar", true]);
    ctx.mock()
        .expect_query(r"SELECT (.+) FROM user WHERE name LIKE \$1$")
        .with_args(args!["Foobar"])
        .will_return_rows(rows)
        .declare()?;

    let provider = get_provider_by_name(ctx.conn(), "Foobar")?;
    assert_eq!(
        provider,
        Provider {
            id: 1,
            name: "Foobar".into(),
            searchable: true,
        }
    );

    ctx.verify()?;
    Ok(())
}

#[test]
fn provider_lookup_decodes_text_columns_by_declared_type() -> Result<()> {
    let ctx = MockContext::new();
    let rows = RowSet::typed([
        ("id", SqlType::Int),
        ("name", SqlType::Text),
        ("searchable", SqlType::Bool),
    ])
    .add_row(values!["1", "Foobar", "true"]);
    ctx.mock()
        .expect_query(r"SELECT (.+) FROM user WHERE name LIKE \$1$")
        .will_return_rows(rows)
        .declare()?;

    let provider = get_provider_by_name(ctx.conn(), "Foobar")?;
    assert!(provider.searchable);
    assert_eq!(provider.id, 1);
    Ok(())
}

#[test]
fn provider_rows_fixture_roundtrips() -> Result<()> {
    let expected = Provider {
        id: 7,
        name: "Acme".into(),
        searchable: false,
    };
    let ctx = MockContext::new();
    ctx.mock()
        .expect_query("FROM user")
        .will_return_rows(provider_rows(std::slice::from_ref(&expected)))
        .declare()?;

    assert_eq!(get_provider_by_name(ctx.conn(), "Acme")?, expected);
    Ok(())
}

#[test]
fn missing_provider_is_no_rows() {
    let ctx = MockContext::new();
    ctx.mock()
        .expect_query("FROM user")
        .will_return_rows(provider_rows(&[]))
        .declare()
        .unwrap();

    assert_eq!(
        get_provider_by_name(ctx.conn(), "nobody").unwrap_err(),
        DbError::NoRows
    );
}

#[test]
fn unordered_context_runs_routines_in_any_order() -> Result<()> {
    let ctx = MockContext::unordered();
    let mock = ctx.mock();
    mock.expect_query("FROM user")
        .will_return_rows(provider_rows(&[Provider {
            id: 1,
            name: "Foobar".into(),
            searchable: true,
        }]))
        .declare()?;
    mock.expect_begin().declare()?;
    mock.expect_exec("UPDATE products")
        .will_return_result(1, 1)
        .declare()?;
    mock.expect_exec("INSERT INTO product_viewers")
        .will_return_result(1, 1)
        .declare()?;
    mock.expect_commit().declare()?;

    record_stats(ctx.conn(), 2, 3)?;
    get_provider_by_name(ctx.conn(), "Foobar")?;

    ctx.verify()?;
    Ok(())
}

#[test]
fn listing_query_returns_every_declared_row() -> Result<()> {
    let ctx = MockContext::new();
    ctx.mock()
        .expect_query("SELECT id FROM products")
        .will_return_rows(RowSet::new(["id"]).add_rows([values![1], values![2], values![3]]))
        .declare()?;

    let rows = ctx.conn().query("SELECT id FROM products ORDER BY id", &[])?.collect_rows()?;
    assert_row_sets_equal(&rows, &[int_row(&[1]), int_row(&[2]), int_row(&[3])]);

    ctx.verify()?;
    Ok(())
}
