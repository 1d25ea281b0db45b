use crate::repository::{airline_row, Airline};
use couchmap::common::Value;
use couchmap::errors::ErrorKind;
use couchmap::query::{Consistency, PageRequest, QueryScanConsistency};
use couchmap::repository::{ExecutionKind, ExecutionPath, QueryMethod, QueryOutcome, ReturnShape};
use couchmap_int_test::test_util::{cleanup, create_test_context, run_test};
use serde_json::json;

const BY_COUNTRY: &str = "$SELECT_ENTITY$ WHERE country = $1";

fn spanish_airlines() -> Vec<serde_json::Value> {
    vec![
        airline_row("airline::1", 1, "Air Nostrum", "Spain"),
        airline_row("airline::2", 2, "Vueling", "Spain"),
        airline_row("airline::3", 3, "Iberia", "Spain"),
    ]
}

#[test]
fn test_entity_query_binds_arguments() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            ctx.responder().respond(
                "WHERE name = $1",
                vec![airline_row("airline::2", 2, "Vueling", "Spain")],
            );

            let outcome = repository.query(
                "$SELECT_ENTITY$ WHERE name = $1",
                QueryMethod::new("findByName", ReturnShape::Entity),
                vec![Value::from("Vueling")],
                None,
            )?;
            match outcome {
                QueryOutcome::Entity(Some(found)) => assert_eq!(found.id, "airline::2"),
                _ => panic!("expected a single entity"),
            }

            let executed = ctx.client().executed_queries().pop().unwrap();
            assert_eq!(
                executed.statement().as_str(),
                format!(
                    "SELECT META(`{0}`).id AS _ID, META(`{0}`).cas AS _CAS, `{0}`.* FROM `{0}` WHERE name = $1",
                    ctx.bucket_name()
                )
            );
            assert!(executed.is_parameterized());
            assert_eq!(executed.args(), &[Value::from("Vueling")]);
            assert_eq!(
                executed.params().scan_consistency(),
                QueryScanConsistency::RequestPlus
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_entity_query_without_rows_is_none() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let outcome = repository.query(
                "$SELECT_ENTITY$ WHERE name = $1",
                QueryMethod::new("findByName", ReturnShape::Entity),
                vec![Value::from("Nobody")],
                None,
            )?;
            assert!(matches!(outcome, QueryOutcome::Entity(None)));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_collection_and_stream_queries() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            ctx.responder().respond("WHERE country", spanish_airlines());

            let outcome = repository.query(
                BY_COUNTRY,
                QueryMethod::new("findByCountry", ReturnShape::Collection),
                vec![Value::from("Spain")],
                None,
            )?;
            match outcome {
                QueryOutcome::Collection(airlines) => {
                    assert_eq!(airlines.len(), 3);
                    assert_eq!(airlines[2].name, "Iberia");
                }
                _ => panic!("expected a collection"),
            }

            let outcome = repository.query(
                BY_COUNTRY,
                QueryMethod::new("streamByCountry", ReturnShape::Stream),
                vec![Value::from("Spain")],
                None,
            )?;
            match outcome {
                QueryOutcome::Stream(stream) => {
                    let names = stream
                        .map(|airline| airline.map(|airline| airline.name))
                        .collect::<Result<Vec<_>, _>>()?;
                    assert_eq!(names, vec!["Air Nostrum", "Vueling", "Iberia"]);
                }
                _ => panic!("expected a stream"),
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_paged_query_counts_then_fetches_page() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let responder = ctx.responder();
            responder.respond("COUNT(*)", vec![json!({"count": 3})]);
            responder.respond(
                "WHERE country",
                vec![airline_row("airline::3", 3, "Iberia", "Spain")],
            );

            let outcome = repository.query(
                BY_COUNTRY,
                QueryMethod::new("findByCountry", ReturnShape::Page),
                vec![Value::from("Spain")],
                Some(PageRequest::new(1, 2)?),
            )?;
            let page = match outcome {
                QueryOutcome::Page(page) => page,
                _ => panic!("expected a page"),
            };
            assert_eq!(page.total_elements(), 3);
            assert_eq!(page.total_pages(), 2);
            assert!(!page.has_next());
            assert_eq!(page.content()[0].id, "airline::3");

            let bucket = ctx.bucket_name();
            let executed = ctx.client().executed_queries();
            let count = &executed[executed.len() - 2];
            let content = &executed[executed.len() - 1];
            assert_eq!(
                count.statement().as_str(),
                format!("SELECT COUNT(*) AS count FROM `{}` WHERE country = $1", bucket)
            );
            assert_eq!(count.args(), &[Value::from("Spain")]);
            assert!(content
                .statement()
                .as_str()
                .ends_with("WHERE country = $1 LIMIT 2 OFFSET 2"));
            assert_eq!(content.args(), &[Value::from("Spain")]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_paged_query_requires_count_column() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let responder = ctx.responder();
            responder.respond("COUNT(*)", vec![json!({"total": 3})]);
            responder.respond("WHERE country", spanish_airlines());

            let err = repository
                .query(
                    BY_COUNTRY,
                    QueryMethod::new("findByCountry", ReturnShape::Page),
                    vec![Value::from("Spain")],
                    Some(PageRequest::of_size(2)?),
                )
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::QueryError);
            assert!(err.message().contains(&format!(
                "SELECT COUNT(*) AS count FROM `{}` WHERE country = $1",
                ctx.bucket_name()
            )));
            assert!(ctx
                .executed_statements()
                .iter()
                .all(|statement| !statement.ends_with("LIMIT 2")));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_largest_slice_window_is_addressable() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let query = repository.string_query(
                BY_COUNTRY,
                QueryMethod::new("sliceByCountry", ReturnShape::Slice),
            );

            let page = PageRequest::new(0, usize::MAX - 1)?;
            match query.prepare_execution(vec![Value::from("Spain")], Some(page))? {
                ExecutionPath::Sliced { content, .. } => assert!(content
                    .statement()
                    .as_str()
                    .ends_with(&format!("WHERE country = $1 LIMIT {}", usize::MAX))),
                _ => panic!("expected a sliced path"),
            }

            let err = PageRequest::new(0, usize::MAX).err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            let err = PageRequest::new(usize::MAX / 2 + 1, 2).err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_sliced_query_fetches_one_extra_row() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            ctx.responder().respond("WHERE country", spanish_airlines());

            let outcome = repository.query(
                BY_COUNTRY,
                QueryMethod::new("sliceByCountry", ReturnShape::Slice),
                vec![Value::from("Spain")],
                Some(PageRequest::of_size(2)?),
            )?;
            let slice = match outcome {
                QueryOutcome::Slice(slice) => slice,
                _ => panic!("expected a slice"),
            };
            assert_eq!(slice.content().len(), 2);
            assert!(slice.has_next());
            assert_eq!(slice.next_request(), Some(PageRequest::new(1, 2)?));

            let statements = ctx.executed_statements();
            assert!(statements.last().unwrap().ends_with("WHERE country = $1 LIMIT 3"));
            assert!(statements.iter().all(|statement| !statement.contains("COUNT(*)")));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_template_without_select_entity_counts_subquery() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let query = repository.string_query(
                "SELECT $ENTITY$, $BUCKET$.* FROM $BUCKET$ WHERE country = $1",
                QueryMethod::new("findByCountry", ReturnShape::Page),
            );

            let bucket = ctx.bucket_name();
            let content = format!(
                "SELECT META(`{0}`).id AS _ID, META(`{0}`).cas AS _CAS, `{0}`.* FROM `{0}` WHERE country = $1",
                bucket
            );
            assert_eq!(query.statement().as_str(), content);
            assert_eq!(
                query.count_statement().as_str(),
                format!("SELECT COUNT(*) AS count FROM ({}) AS sub", content)
            );

            let path = query.prepare_execution(vec![Value::from("Spain")], Some(PageRequest::of_size(10)?))?;
            assert_eq!(path.kind(), ExecutionKind::Paged);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_consistency_can_be_overridden() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let query = repository
                .string_query(BY_COUNTRY, QueryMethod::new("findByCountry", ReturnShape::Collection))
                .with_consistency(Consistency::EventuallyConsistent);
            query.execute(vec![Value::from("Spain")], None)?;

            let executed = ctx.client().executed_queries().pop().unwrap();
            assert_eq!(
                executed.params().scan_consistency(),
                QueryScanConsistency::NotBounded
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_unsupported_methods_run_nothing() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            let before = ctx.executed_statements().len();

            let err = repository
                .query(
                    "DELETE FROM $BUCKET$ WHERE country = $1",
                    QueryMethod::new("deleteByCountry", ReturnShape::Collection).modifying(),
                    vec![Value::from("Spain")],
                    None,
                )
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);

            let err = repository
                .query(
                    "SELECT COUNT(*) FROM $BUCKET$",
                    QueryMethod::new("countAll", ReturnShape::Other),
                    vec![],
                    None,
                )
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);

            let err = repository
                .query(
                    BY_COUNTRY,
                    QueryMethod::new("findByCountry", ReturnShape::Page),
                    vec![Value::from("Spain")],
                    None,
                )
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            assert_eq!(ctx.executed_statements().len(), before);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_failed_query_method_is_reported() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = ctx.couchmap().repository::<Airline>()?;
            ctx.responder().fail("WHERE country", "index not found");

            let err = repository
                .query(
                    BY_COUNTRY,
                    QueryMethod::new("findByCountry", ReturnShape::Collection),
                    vec![Value::from("Spain")],
                    None,
                )
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::QueryError);
            assert!(err.message().contains("index not found"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
