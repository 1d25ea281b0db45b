use couchmap::couchmap::Couchmap;
use couchmap::couchmap_builder::CouchmapBuilder;
use couchmap::errors::CouchmapResult;
use couchmap::query::BoundQuery;
use couchmap::store::{InMemoryStoreClient, QueryResult, StoreClient};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Runs a test between a setup and a teardown step.
///
/// The teardown runs even when the test fails; the first error is reported
/// through a panic so the test harness shows it with its cause chain.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> CouchmapResult<()>,
    B: Fn() -> CouchmapResult<TestContext>,
    A: Fn(TestContext) -> CouchmapResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let test_result = test(ctx.clone());
    let after_result = after(ctx);

    if let Err(e) = test_result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// Canned responses for the statements a test expects to run.
///
/// The first registered fragment contained in a statement decides the
/// response. Index lookups report a missing index and DDL succeeds unless
/// a test registers something else; anything unmatched returns no rows.
#[derive(Default)]
pub struct QueryResponder {
    responses: Mutex<Vec<(String, QueryResult)>>,
}

impl QueryResponder {
    pub fn new() -> Self {
        QueryResponder::default()
    }

    pub fn respond(&self, fragment: &str, rows: Vec<serde_json::Value>) {
        self.push(fragment, QueryResult::success(rows));
    }

    pub fn fail(&self, fragment: &str, error: &str) {
        self.push(fragment, QueryResult::failure(vec![error.to_string()]));
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, fragment: &str, result: QueryResult) {
        self.lock().push((fragment.to_string(), result));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, QueryResult)>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn answer(&self, query: &BoundQuery) -> CouchmapResult<QueryResult> {
        let statement = query.statement().as_str();
        let registered = self
            .lock()
            .iter()
            .find(|(fragment, _)| statement.contains(fragment.as_str()))
            .map(|(_, result)| result.clone());

        Ok(match registered {
            Some(result) => result,
            None if statement.contains("system:indexes") => {
                QueryResult::success(vec![json!({"exist": false})])
            }
            None => QueryResult::success(vec![]),
        })
    }
}

#[derive(Clone)]
pub struct TestContext {
    couchmap: Couchmap,
    client: Arc<InMemoryStoreClient>,
    responder: Arc<QueryResponder>,
}

impl TestContext {
    pub fn couchmap(&self) -> Couchmap {
        self.couchmap.clone()
    }

    pub fn client(&self) -> Arc<InMemoryStoreClient> {
        self.client.clone()
    }

    pub fn responder(&self) -> Arc<QueryResponder> {
        self.responder.clone()
    }

    pub fn bucket_name(&self) -> String {
        self.client.bucket_name().to_string()
    }

    /// Statements run so far, in order.
    pub fn executed_statements(&self) -> Vec<String> {
        self.client
            .executed_queries()
            .iter()
            .map(|query| query.statement().as_str().to_string())
            .collect()
    }
}

pub fn random_bucket_name() -> String {
    format!("bucket-{}", uuid::Uuid::new_v4().simple())
}

pub fn create_test_context() -> CouchmapResult<TestContext> {
    create_test_context_with(|builder| builder)
}

/// Opens an instance over a fresh in-memory bucket, letting the test tune
/// the builder first.
pub fn create_test_context_with<F>(configure: F) -> CouchmapResult<TestContext>
where
    F: FnOnce(CouchmapBuilder) -> CouchmapBuilder,
{
    let responder = Arc::new(QueryResponder::new());
    let handler_responder = responder.clone();
    let client = Arc::new(
        InMemoryStoreClient::new(&random_bucket_name())
            .with_query_handler(move |query| handler_responder.answer(query)),
    );

    let couchmap = configure(Couchmap::builder()).open(client.clone())?;
    Ok(TestContext {
        couchmap,
        client,
        responder,
    })
}

pub fn cleanup(ctx: TestContext) -> CouchmapResult<()> {
    log::debug!(
        "Bucket {} finished with {} documents after {} queries",
        ctx.bucket_name(),
        ctx.client.len(),
        ctx.client.executed_queries().len()
    );
    ctx.responder.clear();
    Ok(())
}
