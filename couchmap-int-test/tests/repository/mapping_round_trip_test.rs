use crate::repository::{airline, Airline, Counter, Geo, Hotel, Landmark, Rating, Route};
use chrono::{TimeZone, Utc};
use couchmap::common::Value;
use couchmap::convert::TranslationService;
use couchmap::doc;
use couchmap::document::Document;
use couchmap::errors::ErrorKind;
use couchmap_int_test::test_util::{cleanup, create_test_context, create_test_context_with, run_test};

fn hotel() -> Hotel {
    Hotel {
        id: "hotel::10025".to_string(),
        name: "Medway Youth Hostel".to_string(),
        city: "Gillingham".to_string(),
        geo: Geo {
            lat: 51.35785,
            lon: 0.55818,
        },
        rating: Rating::Review {
            score: 4,
            comment: "Très bien".to_string(),
        },
        tags: vec!["hostel".to_string(), "garden".to_string()],
        opened: Some(Utc.with_ymd_and_hms(2009, 6, 1, 12, 0, 0).unwrap()),
        distance: 0.0,
    }
}

#[test]
fn test_write_then_read_restores_entity() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let source = airline("airline::10", "40-Mile Air", "United States");

            let document = converter.to_document(&source)?;
            assert_eq!(document.id(), Some("airline::10"));
            assert_eq!(document.version(), None);
            assert_eq!(
                document.raw_value(),
                Some(r#"{"name":"40-Mile Air","country":"United States"}"#)
            );

            let restored: Airline = converter.read(&document)?;
            assert_eq!(restored, source);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_version_and_renamed_field_travel_out_of_band() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let source = Airline {
                cas: 1_500_000,
                iata: Some("Q5".to_string()),
                ..airline("airline::10", "40-Mile Air", "United States")
            };

            let document = converter.to_document(&source)?;
            assert_eq!(document.version(), Some(1_500_000));
            assert_eq!(document.get("iata_code"), Some(&Value::from("Q5")));
            assert!(!document.contains_field("iata"));
            assert!(!document.contains_field("id"));
            assert!(!document.contains_field("cas"));

            let raw = document.raw_value().unwrap_or_default().to_string();
            let restored: Airline = converter.read_raw("airline::10", &raw, 1_500_000)?;
            assert_eq!(restored, source);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_nested_values_round_trip() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let source = Hotel {
                distance: 12.5,
                ..hotel()
            };

            let document = converter.to_document(&source)?;
            assert_eq!(document.expiry(), 3600);
            assert!(!document.contains_field("distance"));

            let raw = document.raw_value().unwrap_or_default();
            assert!(raw.contains(r#""geo":{"lat":51.35785,"lon":0.55818}"#));
            assert!(raw.contains("Très bien"));
            assert!(raw.contains(r#""opened":"2009-06-01T12:00:00+00:00""#));

            let restored: Hotel = converter.read(&document)?;
            assert_eq!(restored, hotel());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_enum_variants_round_trip() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            for rating in [Rating::Unrated, Rating::Stars(5)] {
                let source = Hotel {
                    rating: rating.clone(),
                    ..hotel()
                };
                let restored: Hotel = converter.read(&converter.to_document(&source)?)?;
                assert_eq!(restored.rating, rating);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_constructor_arguments_bind_before_fields() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let source = Route {
                id: "route::1".to_string(),
                source: "TLV".to_string(),
                destination: "MRS".to_string(),
                stops: 1,
            };
            let restored: Route = converter.read(&converter.to_document(&source)?)?;
            assert_eq!(restored, source);

            // fields absent from the document keep the value given at construction
            let mut partial = doc! { source: "SFO" };
            partial.set_id("route::2");
            let restored: Route = converter.read(&partial)?;
            assert_eq!(restored.id, "route::2");
            assert_eq!(restored.source, "SFO");
            assert_eq!(restored.destination, "");
            assert_eq!(restored.stops, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_numeric_id_is_stored_as_string() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let source = Counter { id: 42, value: -3 };
            let document = converter.to_document(&source)?;
            assert_eq!(document.id(), Some("42"));

            let restored: Counter = converter.read(&document)?;
            assert_eq!(restored, source);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_missing_source_is_a_no_op() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let mut target = doc! { untouched: true };
            target.set_id("keep");
            let before = target.clone();

            converter.write::<Airline>(None, &mut target)?;
            assert_eq!(target, before);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_entity_without_id_cannot_be_written() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let landmark = Landmark {
                name: "Tower Bridge".to_string(),
                activity: "see".to_string(),
            };
            let mut target = doc! { untouched: true };

            let err = converter.write(Some(&landmark), &mut target).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
            assert_eq!(err.message(), "ID property required for entity of type Landmark");
            assert_eq!(target, doc! { untouched: true });
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_wrong_field_type_names_property() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let mut document = doc! { name: "Air", country: 7 };
            document.set_id("airline::1");

            let err = converter.read::<Airline>(&document).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
            assert_eq!(err.message(), "Could not read property 'country' of entity type Airline");
            assert!(err.cause().is_some());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_null_field_resets_to_default() {
    run_test(
        || create_test_context(),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let mut document = Document::with_id("hotel::1");
            ctx.couchmap().converter().translation_service().decode(
                r#"{"name":"Inn","city":null,"tags":null,"opened":null}"#,
                &mut document,
            )?;

            let restored: Hotel = converter.read(&document)?;
            assert_eq!(restored.name, "Inn");
            assert_eq!(restored.city, "");
            assert!(restored.tags.is_empty());
            assert_eq!(restored.opened, None);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_type_key_is_written_first() {
    run_test(
        || create_test_context_with(|builder| builder.type_key("_class")),
        |ctx| {
            let converter = ctx.couchmap().converter().clone();
            let source = airline("airline::10", "40-Mile Air", "United States");

            let document = converter.to_document(&source)?;
            assert_eq!(document.fields()[0], "_class");
            assert_eq!(document.get("_class"), Some(&Value::from("Airline")));

            let restored: Airline = converter.read(&document)?;
            assert_eq!(restored, source);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
