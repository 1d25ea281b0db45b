use crate::repository::{airline, airline_row, Airline};
use couchmap::errors::ErrorKind;
use couchmap::query::{Consistency, PageRequest, QueryScanConsistency};
use couchmap_int_test::test_util::{cleanup, create_test_context, create_test_context_with, run_test};
use serde_json::json;

#[test]
fn test_repository_crud() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            assert_eq!(repository.entity().name(), "Airline");
            assert_eq!(repository.consistency(), Consistency::ReadYourOwnWrites);

            let cas = repository.save(&airline("airline::1", "Air Nostrum", "Spain"))?;
            assert!(repository.exists_by_id("airline::1")?);

            let found = repository.find_by_id("airline::1")?.unwrap();
            assert_eq!(found.cas, cas);
            assert_eq!(found.country, "Spain");

            let err = repository
                .insert(&airline("airline::1", "Duplicate", "Spain"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DocumentExists);

            repository.delete_by_id("airline::1")?;
            assert!(repository.find_by_id("airline::1")?.is_none());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_find_all_reads_page_and_total() {
    run_test(
        || create_test_context_with(|builder| builder.type_key("_class")),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let responder = ctx.responder();
            responder.respond("COUNT(*)", vec![json!({"count": 5})]);
            responder.respond(
                "META(",
                vec![
                    airline_row("airline::3", 3, "Air Austral", "France"),
                    airline_row("airline::4", 4, "Air Corsica", "France"),
                ],
            );

            let page = repository.find_all(PageRequest::new(1, 2)?)?;
            assert_eq!(page.total_elements(), 5);
            assert_eq!(page.total_pages(), 3);
            assert_eq!(page.number_of_elements(), 2);
            assert!(page.has_next());
            assert!(page.has_previous());
            assert_eq!(page.content()[0].id, "airline::3");

            let bucket = ctx.bucket_name();
            let statements = ctx.executed_statements();
            let count = &statements[statements.len() - 2];
            let content = &statements[statements.len() - 1];
            assert_eq!(
                count,
                &format!("SELECT COUNT(*) AS count FROM `{0}` WHERE `_class` = \"Airline\"", bucket)
            );
            assert_eq!(
                content,
                &format!(
                    "SELECT META(`{0}`).id AS _ID, META(`{0}`).cas AS _CAS, `{0}`.* FROM `{0}` WHERE `_class` = \"Airline\" LIMIT 2 OFFSET 2",
                    bucket
                )
            );

            let last = ctx.client().executed_queries().pop().unwrap();
            assert_eq!(last.params().scan_consistency(), QueryScanConsistency::RequestPlus);
            assert!(!last.is_parameterized());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_count_uses_configured_consistency() {
    run_test(
        || create_test_context_with(|builder| builder.consistency(Consistency::EventuallyConsistent)),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            ctx.responder().respond("COUNT(*)", vec![json!({"count": 7})]);

            assert_eq!(repository.count()?, 7);
            let last = ctx.client().executed_queries().pop().unwrap();
            assert_eq!(last.params().scan_consistency(), QueryScanConsistency::NotBounded);
            assert_eq!(
                last.statement().as_str(),
                format!("SELECT COUNT(*) AS count FROM `{}`", ctx.bucket_name())
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_count_without_rows_is_zero() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            assert_eq!(repository.count()?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_count_without_count_column_is_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            ctx.responder().respond("COUNT(*)", vec![json!({"total": 7})]);

            let err = repository.count().err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::QueryError);
            assert!(err.message().contains("SELECT COUNT(*) AS count FROM"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
