use crate::repository::{Airline, Hotel, Landmark};
use couchmap::errors::ErrorKind;
use couchmap::index::{default_map_function, EntityIndex, IndexStatus};
use couchmap::store::StoreClient;
use couchmap_int_test::test_util::{cleanup, create_test_context, create_test_context_with, run_test};
use serde_json::json;

#[test]
fn test_repository_creates_missing_n1ql_indexes() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.couchmap().repository::<Airline>()?;

            let bucket = ctx.bucket_name();
            let statements = ctx.executed_statements();
            assert_eq!(statements.len(), 4);
            assert!(statements[0].contains("system:indexes"));
            assert!(statements[0].contains("is_primary"));
            assert_eq!(statements[1], format!("CREATE PRIMARY INDEX ON `{}`", bucket));
            assert!(statements[2].contains("name = \"idx_airline\""));
            assert_eq!(
                statements[3],
                format!(
                    "CREATE INDEX `idx_airline` ON `{}`(`_class`) WHERE `_class` = \"Airline\"",
                    bucket
                )
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_existing_indexes_are_left_alone() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.responder().respond("system:indexes", vec![json!({"exist": true})]);

            let reports = ctx.couchmap().build_indexes::<Airline>()?;
            assert_eq!(reports.len(), 2);
            assert_eq!(reports[0].index(), &EntityIndex::N1qlPrimary);
            assert!(reports
                .iter()
                .all(|report| report.status() == IndexStatus::AlreadyExists));
            assert!(ctx
                .executed_statements()
                .iter()
                .all(|statement| !statement.starts_with("CREATE")));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_ignored_indexes_run_no_queries() {
    run_test(
        || {
            create_test_context_with(|builder| {
                builder
                    .ignore_n1ql_primary(true)
                    .ignore_n1ql_secondary(true)
                    .ignore_views(true)
            })
        },
        |ctx| {
            let reports = ctx.couchmap().build_indexes::<Airline>()?;
            assert!(reports
                .iter()
                .all(|report| report.status() == IndexStatus::Ignored));

            let reports = ctx.couchmap().build_indexes::<Hotel>()?;
            assert_eq!(reports[0].status(), IndexStatus::Ignored);

            assert!(ctx.executed_statements().is_empty());
            assert!(ctx.client().get_design_document("hotel")?.is_none());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_only_secondary_ignored() {
    run_test(
        || create_test_context_with(|builder| builder.ignore_n1ql_secondary(true)),
        |ctx| {
            let reports = ctx.couchmap().build_indexes::<Airline>()?;
            assert_eq!(reports[0].status(), IndexStatus::Created);
            assert_eq!(reports[1].status(), IndexStatus::Ignored);
            assert_eq!(ctx.executed_statements().len(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_view_is_created_in_design_document() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.couchmap().repository::<Hotel>()?;

            let design = ctx.client().get_design_document("hotel")?.unwrap();
            let view = design.view("all").unwrap();
            assert_eq!(view.map(), default_map_function("Hotel"));
            assert!(view.map().contains("emit(meta.id, null)"));
            assert!(view.reduce().is_none());

            // a second run finds the view in place
            let reports = ctx.couchmap().build_indexes::<Hotel>()?;
            assert_eq!(reports[0].status(), IndexStatus::AlreadyExists);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_entity_without_indexes_needs_nothing() {
    run_test(
        || create_test_context(),
        |ctx| {
            let reports = ctx.couchmap().build_indexes::<Landmark>()?;
            assert!(reports.is_empty());
            assert!(ctx.executed_statements().is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_failed_index_creation_is_reported() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.responder()
                .fail("CREATE PRIMARY INDEX", "index creation is not allowed");

            let err = ctx.couchmap().repository::<Airline>().err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::IndexingError);
            assert!(err.message().contains("index creation is not allowed"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_failed_index_lookup_is_reported() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.responder().fail("system:indexes", "keyspace not found");
            let err = ctx.couchmap().build_indexes::<Airline>().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexingError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
