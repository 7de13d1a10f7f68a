//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iam_console_gateway::{
    GatewayError, InMemoryGateway, ListQuery, Page, Record, RecordGateway, Result,
};
use tokio::sync::Notify;

use crate::controllers::{FormController, FormSchema, ListController};
use crate::notify::RecordingNotifier;

// ===== MockGateway =====

/// 包装 `InMemoryGateway`，增加调用计数、注入错误和可控的列表响应时机
pub struct MockGateway {
    inner: InMemoryGateway,
    /// 每次 list 调用依次取出一个；存在时响应在 notify 之后才返回
    gates: Mutex<VecDeque<Arc<Notify>>>,
    /// 同上，作用于 create / update
    write_gates: Mutex<VecDeque<Arc<Notify>>>,
    injected: Mutex<Option<GatewayError>>,
    queries: Mutex<Vec<ListQuery>>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    option_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new(collection: &str, records: Vec<Record>) -> Self {
        Self {
            inner: InMemoryGateway::with_records(collection, "id", records),
            gates: Mutex::new(VecDeque::new()),
            write_gates: Mutex::new(VecDeque::new()),
            injected: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            option_calls: AtomicUsize::new(0),
        }
    }

    /// 下一个尚未被拦截的 list 调用会等待返回的 `Notify`
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    /// 下一个 create / update 调用会等待返回的 `Notify`
    pub fn hold_next_write(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.write_gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    async fn pass_write_gate(&self) {
        let gate = self.write_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    /// 下一次调用返回 failure envelope
    pub async fn fail_next(&self, message: &str) {
        self.inner.fail_next(message).await;
    }

    /// 下一次调用返回指定错误（例如网络错误）
    pub fn fail_next_with(&self, error: GatewayError) {
        *self.injected.lock().unwrap() = Some(error);
    }

    pub async fn set_options(&self, field: &str, values: &[&str]) {
        self.inner
            .set_options(field, values.iter().map(ToString::to_string).collect())
            .await;
    }

    pub fn last_list_query(&self) -> Option<ListQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn option_calls(&self) -> usize {
        self.option_calls.load(Ordering::SeqCst)
    }

    fn take_injected(&self) -> Result<()> {
        match self.injected.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordGateway for MockGateway {
    fn collection(&self) -> &str {
        self.inner.collection()
    }

    async fn list_records(&self, query: &ListQuery) -> Result<Page> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        let gate = self.gates.lock().unwrap().pop_front();

        // 先按请求时的数据计算结果，再等待放行
        let result = match self.take_injected() {
            Ok(()) => self.inner.list_records(query).await,
            Err(e) => Err(e),
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn get_record(&self, id: &str) -> Result<Record> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected()?;
        self.inner.get_record(id).await
    }

    async fn create_record(&self, fields: &Record) -> Result<Record> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_write_gate().await;
        self.take_injected()?;
        self.inner.create_record(fields).await
    }

    async fn update_record(&self, id: &str, fields: &Record) -> Result<Record> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_write_gate().await;
        self.take_injected()?;
        self.inner.update_record(id, fields).await
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected()?;
        self.inner.delete_record(id).await
    }

    async fn list_options(&self, field: &str) -> Result<Vec<String>> {
        self.option_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected()?;
        self.inner.list_options(field).await
    }
}

// ===== 工厂方法 =====

/// `n` 条公告式记录：id 从 1 开始，奇数 WAITING，偶数 COMPLETED
pub fn numbered_records(n: u64) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            Record::new()
                .with("id", i)
                .with("taskId", 100 + i)
                .with("content", format!("<p>notice {i}</p>"))
                .with("status", if i % 2 == 0 { "COMPLETED" } else { "WAITING" })
        })
        .collect()
}

/// 创建测试用表单：(form, list, gateway, notifier)
pub fn create_test_form(
    schema: Arc<dyn FormSchema>,
    records: Vec<Record>,
) -> (
    FormController,
    Arc<ListController>,
    Arc<MockGateway>,
    Arc<RecordingNotifier>,
) {
    let gateway = Arc::new(MockGateway::new("test-records", records));
    let notifier = Arc::new(RecordingNotifier::new());
    let list = Arc::new(ListController::new(gateway.clone(), notifier.clone(), 10));
    let form = FormController::new(gateway.clone(), list.clone(), notifier.clone(), schema);
    (form, list, gateway, notifier)
}
