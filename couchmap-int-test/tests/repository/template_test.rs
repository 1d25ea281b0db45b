use crate::repository::{airline, airline_row, Airline, Hotel};
use couchmap::common::Value;
use couchmap::couchmap::Couchmap;
use couchmap::errors::ErrorKind;
use couchmap::index::{DesignDocument, ViewDefinition};
use couchmap::query::{build_query, Consistency, QueryScanConsistency, Statement, ViewQuery};
use couchmap::store::{InMemoryStoreClient, StoreClient, ViewRow};
use couchmap_int_test::test_util::{cleanup, create_test_context, run_test};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_save_stores_encoded_document() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.couchmap().template().clone();
            let cas = template.save(&airline("airline::1", "Air Nostrum", "Spain"))?;
            assert!(cas > 0);

            let stored = ctx.client().get("airline::1")?.unwrap();
            assert_eq!(stored.content(), r#"{"name":"Air Nostrum","country":"Spain"}"#);
            assert_eq!(stored.cas(), cas);
            assert_eq!(stored.expiry(), 0);

            let found: Airline = template.find_by_id("airline::1")?.unwrap();
            assert_eq!(found.cas, cas);
            assert_eq!(found.name, "Air Nostrum");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_save_with_stale_version_fails() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.couchmap().template().clone();
            template.save(&airline("airline::1", "Air Nostrum", "Spain"))?;

            let mut current: Airline = template.find_by_id("airline::1")?.unwrap();
            let stale = current.clone();
            current.country = "Portugal".to_string();
            let new_cas = template.save(&current)?;
            assert_ne!(new_cas, stale.cas);

            let err = template.save(&stale).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CasMismatch);

            let found: Airline = template.find_by_id("airline::1")?.unwrap();
            assert_eq!(found.country, "Portugal");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_versioned_save_of_missing_document_fails() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.couchmap().template().clone();
            let ghost = Airline {
                cas: 99,
                ..airline("airline::404", "Ghost", "Nowhere")
            };
            let err = template.save(&ghost).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DocumentNotFound);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_insert_rejects_existing_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.couchmap().template().clone();
            template.insert(&airline("airline::1", "Air Nostrum", "Spain"))?;
            let err = template
                .insert(&airline("airline::1", "Other", "France"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DocumentExists);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_remove_and_exists() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.couchmap().template().clone();
            template.save(&airline("airline::1", "Air Nostrum", "Spain"))?;
            assert!(template.exists("airline::1")?);

            template.remove_by_id("airline::1")?;
            assert!(!template.exists("airline::1")?);
            assert!(template.find_by_id::<Airline>("airline::1")?.is_none());

            let err = template.remove_by_id("airline::1").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DocumentNotFound);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_entity_expiry_reaches_store() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.couchmap().template().clone();
            let hotel = Hotel {
                id: "hotel::1".to_string(),
                name: "Inn".to_string(),
                ..Hotel::default()
            };
            template.save(&hotel)?;
            assert_eq!(ctx.client().get("hotel::1")?.unwrap().expiry(), 3600);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_find_by_n1ql_reads_projected_rows() {
    run_test(
        || create_test_context(),
        |ctx| {
            let bucket = ctx.bucket_name();
            // rows selecting the whole bucket alias nest the document under its name
            let mut nested = json!({"_ID": "airline::2", "_CAS": 12});
            nested[bucket.as_str()] = json!({"name": "Vueling", "country": "Spain"});
            ctx.responder().respond(
                "WHERE country",
                vec![airline_row("airline::1", 11, "Air Nostrum", "Spain"), nested],
            );

            let query = build_query(
                Statement::new(format!("SELECT META(`{0}`).id AS _ID, META(`{0}`).cas AS _CAS, `{0}` FROM `{0}` WHERE country = $1", bucket)),
                vec![Value::from("Spain")],
                QueryScanConsistency::RequestPlus,
            );
            let airlines: Vec<Airline> = ctx.couchmap().template().find_by_n1ql(&query)?;
            assert_eq!(airlines.len(), 2);
            assert_eq!(airlines[0].cas, 11);
            assert_eq!(airlines[1].id, "airline::2");
            assert_eq!(airlines[1].name, "Vueling");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_failed_query_is_reported() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.responder().fail("SELEC ", "syntax error - at SELEC");
            let query = build_query(
                Statement::new("SELEC * FROM nowhere"),
                vec![],
                QueryScanConsistency::NotBounded,
            );
            let err = ctx.couchmap().template().query_n1ql(&query).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::QueryError);
            assert!(err.message().contains("syntax error - at SELEC"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_find_by_view_loads_emitted_documents() {
    let client = Arc::new(InMemoryStoreClient::new("travel").with_view_handler(|query| {
        assert_eq!(query.to_query_string()?, "stale=update_after&limit=10");
        Ok(vec![
            ViewRow::new(Some("hotel::1".into()), json!("hotel::1"), json!(null)),
            ViewRow::new(Some("hotel::gone".into()), json!("hotel::gone"), json!(null)),
        ])
    }));
    client
        .upsert_design_document(DesignDocument::new("hotel").with_view("all", ViewDefinition::new("m")))
        .unwrap();

    let couchmap = Couchmap::builder().open(client).unwrap();
    let template = couchmap.template();
    template
        .save(&Hotel {
            id: "hotel::1".to_string(),
            name: "Inn".to_string(),
            ..Hotel::default()
        })
        .unwrap();

    let query = ViewQuery::new("hotel", "all")
        .limit(10)
        .consistency(Consistency::UpdateAfter);
    let hotels: Vec<Hotel> = template.find_by_view(&query).unwrap();
    assert_eq!(hotels.len(), 1);
    assert_eq!(hotels[0].name, "Inn");
}
