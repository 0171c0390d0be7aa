//! Operations and the actions they spawn
//!
//! An operation groups the actions queued by one user request. Actions gained
//! progress messages in version 2, a link to their operation in version 3 and
//! execution-group scheduling in version 4.

use chrono::{DateTime, Utc};
use modeldoc_core::{Map, Result, Value};
use modeldoc_schema::checker::{any, bool, fields, int, list, string, string_map, time};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`Operation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationArgs {
    /// Operation id
    pub id: String,
    /// Human readable summary
    pub summary: String,
    /// When the operation was queued
    pub enqueued: DateTime<Utc>,
    /// When the first task started
    pub started: Option<DateTime<Utc>>,
    /// When the last task completed
    pub completed: Option<DateTime<Utc>>,
    /// Operation status
    pub status: String,
    /// Tasks finished so far
    pub complete_task_count: i64,
    /// Failure message
    pub fail: String,
    /// Tasks spawned
    pub spawned_task_count: i64,
}

/// A user request fanned out to actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    args: OperationArgs,
}

impl Operation {
    /// Create an operation
    pub fn new(args: OperationArgs) -> Self {
        Operation { args }
    }

    pub fn id(&self) -> &str {
        &self.args.id
    }

    pub fn summary(&self) -> &str {
        &self.args.summary
    }

    pub fn enqueued(&self) -> DateTime<Utc> {
        self.args.enqueued
    }

    pub fn started(&self) -> Option<DateTime<Utc>> {
        self.args.started
    }

    pub fn completed(&self) -> Option<DateTime<Utc>> {
        self.args.completed
    }

    pub fn status(&self) -> &str {
        &self.args.status
    }

    pub fn complete_task_count(&self) -> i64 {
        self.args.complete_task_count
    }

    pub fn fail(&self) -> &str {
        &self.args.fail
    }

    pub fn spawned_task_count(&self) -> i64 {
        self.args.spawned_task_count
    }
}

fn operation_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("summary", string())
        .required("enqueued", time())
        .omit("started", time())
        .omit("completed", time())
        .required("status", string())
        .required("complete-task-count", int())
}

fn operation_v2() -> FieldSchema {
    operation_v1()
        .optional("fail", string(), "")
        .optional("spawned-task-count", int(), 0)
}

static OPERATION_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new("operation", &[(1, operation_v1), (2, operation_v2)])
});

impl VersionedEntity for Operation {
    const KIND: &'static str = "operation";

    fn registry() -> &'static SchemaRegistry {
        &OPERATION_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let (fail, spawned_task_count) = if version >= 2 {
            (fields.string("fail")?, fields.int("spawned-task-count")?)
        } else {
            (String::new(), 0)
        };
        Ok(Operation::new(OperationArgs {
            id: fields.string("id")?,
            summary: fields.string("summary")?,
            enqueued: fields.time("enqueued")?,
            started: fields.opt_time("started")?,
            completed: fields.opt_time("completed")?,
            status: fields.string("status")?,
            complete_task_count: fields.int("complete-task-count")?,
            fail,
            spawned_task_count,
        }))
    }
}

impl ToWire for Operation {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("id", a.id.as_str())
            .field("summary", a.summary.as_str())
            .field("enqueued", a.enqueued)
            .opt("started", a.started)
            .opt("completed", a.completed)
            .field("status", a.status.as_str())
            .field("complete-task-count", a.complete_task_count)
            .nonempty("fail", &a.fail)
            .field("spawned-task-count", a.spawned_task_count)
            .into_value()
    }
}

/// A progress message logged by a running action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMessage {
    /// Message text
    pub message: String,
    /// When it was logged
    pub timestamp: DateTime<Utc>,
}

/// Arguments for [`Action`]
#[derive(Debug, Clone, PartialEq)]
pub struct ActionArgs {
    /// Action id
    pub id: String,
    /// Unit the action runs on
    pub receiver: String,
    /// Action name
    pub name: String,
    /// Owning operation id
    pub operation: String,
    /// Parameters passed to the action
    pub parameters: Map,
    /// When the action was queued
    pub enqueued: DateTime<Utc>,
    /// When it started
    pub started: Option<DateTime<Utc>>,
    /// When it completed
    pub completed: Option<DateTime<Utc>>,
    /// Action status
    pub status: String,
    /// Final message
    pub message: String,
    /// Results reported by the action
    pub results: Map,
    /// Progress messages
    pub messages: Vec<ActionMessage>,
    /// Whether it may run alongside other actions
    pub parallel: bool,
    /// Execution group for serialised actions
    pub execution_group: String,
}

/// An action queued on a unit
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    args: ActionArgs,
}

impl Action {
    /// Create an action
    pub fn new(args: ActionArgs) -> Self {
        Action { args }
    }

    pub fn id(&self) -> &str {
        &self.args.id
    }

    pub fn receiver(&self) -> &str {
        &self.args.receiver
    }

    pub fn name(&self) -> &str {
        &self.args.name
    }

    pub fn operation(&self) -> &str {
        &self.args.operation
    }

    pub fn parameters(&self) -> &Map {
        &self.args.parameters
    }

    pub fn enqueued(&self) -> DateTime<Utc> {
        self.args.enqueued
    }

    pub fn started(&self) -> Option<DateTime<Utc>> {
        self.args.started
    }

    pub fn completed(&self) -> Option<DateTime<Utc>> {
        self.args.completed
    }

    pub fn status(&self) -> &str {
        &self.args.status
    }

    pub fn message(&self) -> &str {
        &self.args.message
    }

    pub fn results(&self) -> &Map {
        &self.args.results
    }

    pub fn messages(&self) -> &[ActionMessage] {
        &self.args.messages
    }

    pub fn parallel(&self) -> bool {
        self.args.parallel
    }

    pub fn execution_group(&self) -> &str {
        &self.args.execution_group
    }
}

fn message_schema() -> FieldSchema {
    FieldSchema::new()
        .required("message", string())
        .required("timestamp", time())
}

fn action_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("receiver", string())
        .required("name", string())
        .required("parameters", string_map(any()))
        .required("enqueued", time())
        .omit("started", time())
        .omit("completed", time())
        .required("status", string())
        .optional("message", string(), "")
        .omit("results", string_map(any()))
}

fn action_v2() -> FieldSchema {
    action_v1().omit("messages", list(fields(message_schema())))
}

fn action_v3() -> FieldSchema {
    action_v2().optional("operation", string(), "")
}

fn action_v4() -> FieldSchema {
    action_v3()
        .optional("parallel", bool(), false)
        .optional("execution-group", string(), "")
}

static ACTION_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "action",
        &[(1, action_v1), (2, action_v2), (3, action_v3), (4, action_v4)],
    )
});

impl VersionedEntity for Action {
    const KIND: &'static str = "action";

    fn registry() -> &'static SchemaRegistry {
        &ACTION_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = ActionArgs {
            id: fields.string("id")?,
            receiver: fields.string("receiver")?,
            name: fields.string("name")?,
            operation: String::new(),
            parameters: fields.map("parameters")?,
            enqueued: fields.time("enqueued")?,
            started: fields.opt_time("started")?,
            completed: fields.opt_time("completed")?,
            status: fields.string("status")?,
            message: fields.string("message")?,
            results: fields.map("results")?,
            messages: Vec::new(),
            parallel: false,
            execution_group: String::new(),
        };
        if version >= 2 {
            args.messages = fields
                .items("messages")?
                .into_iter()
                .map(|m| -> Result<_> {
                    Ok(ActionMessage {
                        message: m.string("message")?,
                        timestamp: m.time("timestamp")?,
                    })
                })
                .collect::<Result<_>>()?;
        }
        if version >= 3 {
            args.operation = fields.string("operation")?;
        }
        if version >= 4 {
            args.parallel = fields.bool("parallel")?;
            args.execution_group = fields.string("execution-group")?;
        }
        Ok(Action::new(args))
    }
}

impl ToWire for Action {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let messages: Vec<Value> = a
            .messages
            .iter()
            .map(|m| {
                MapBuilder::new()
                    .field("message", m.message.as_str())
                    .field("timestamp", m.timestamp)
                    .into_value()
            })
            .collect();
        let mut builder = MapBuilder::new()
            .field("id", a.id.as_str())
            .field("receiver", a.receiver.as_str())
            .field("name", a.name.as_str())
            .nonempty("operation", &a.operation)
            .field("parameters", a.parameters.clone())
            .field("enqueued", a.enqueued)
            .opt("started", a.started)
            .opt("completed", a.completed)
            .field("status", a.status.as_str())
            .nonempty("message", &a.message)
            .nonempty_values("results", &a.results)
            .field("parallel", a.parallel)
            .nonempty("execution-group", &a.execution_group);
        if !messages.is_empty() {
            builder = builder.field("messages", messages);
        }
        builder.into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&OPERATION_REGISTRY, &ACTION_REGISTRY]
}
