//! A small calendar service: connections over appointments, tasks and unread
//! folder counts, with lazy loaders that must fire exactly once per request.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Object, Resolved, Value,
    tests::{run, service},
};

const TODAY_SCHEMA: &str = r#"
type Query {
  appointments: AppointmentConnection!
  tasks: TaskConnection!
  unreadCounts: FolderConnection!
}

type Appointment {
  id: ID!
  subject: String
  when: String
  isNow: Boolean!
}

type AppointmentEdge { node: Appointment }
type AppointmentConnection { edges: [AppointmentEdge] }

type Task {
  id: ID!
  title: String
  isComplete: Boolean!
}

type TaskEdge { node: Task }
type TaskConnection { edges: [TaskEdge] }

type Folder {
  id: ID!
  name: String
  unreadCount: Int!
}

type FolderEdge { node: Folder }
type FolderConnection { edges: [FolderEdge] }
"#;

fn appointment() -> Arc<Object> {
    Arc::new(
        Object::new(["Appointment"])
            .with_resolver("id", |_| {
                Resolved::value(Value::Id("appointment-1".into())).ready()
            })
            .with_resolver("subject", |_| Resolved::value("Lunch?").ready())
            .with_resolver("when", |_| Resolved::value("tomorrow").ready())
            .with_resolver("isNow", |_| Resolved::value(false).ready()),
    )
}

fn task() -> Arc<Object> {
    Arc::new(
        Object::new(["Task"])
            .with_resolver("id", |_| Resolved::value(Value::Id("task-1".into())).ready())
            .with_resolver("title", |_| Resolved::value("Don't forget").ready())
            .with_resolver("isComplete", |_| Resolved::value(true).ready()),
    )
}

fn folder() -> Arc<Object> {
    Arc::new(
        Object::new(["Folder"])
            .with_resolver("id", |_| {
                Resolved::value(Value::Id("folder-1".into())).ready()
            })
            .with_resolver("name", |_| Resolved::value("\"Fake\" inbox").ready())
            .with_resolver("unreadCount", |_| Resolved::value(3).ready()),
    )
}

fn connection(type_names: [&'static str; 2], node: Arc<Object>) -> Arc<Object> {
    let [connection_name, edge_name] = type_names;
    let edge = Arc::new(Object::new([edge_name]).with_resolver("node", move |_| {
        Resolved::object(Arc::clone(&node)).ready()
    }));

    Arc::new(Object::new([connection_name]).with_resolver("edges", move |_| {
        Resolved::List(vec![Resolved::object(Arc::clone(&edge))]).ready()
    }))
}

/// The query root: each loader counts its invocations.
fn today_root(loads: &Arc<[AtomicUsize; 3]>) -> Object {
    let appointments = connection(["AppointmentConnection", "AppointmentEdge"], appointment());
    let tasks = connection(["TaskConnection", "TaskEdge"], task());
    let unread = connection(["FolderConnection", "FolderEdge"], folder());

    let loads_appointments = Arc::clone(loads);
    let loads_tasks = Arc::clone(loads);
    let loads_unread = Arc::clone(loads);

    Object::new(["Query"])
        .with_resolver("appointments", move |_| {
            loads_appointments[0].fetch_add(1, Ordering::SeqCst);
            Resolved::object(Arc::clone(&appointments)).ready()
        })
        .with_resolver("tasks", move |_| {
            loads_tasks[1].fetch_add(1, Ordering::SeqCst);
            Resolved::object(Arc::clone(&tasks)).ready()
        })
        .with_resolver("unreadCounts", move |_| {
            loads_unread[2].fetch_add(1, Ordering::SeqCst);
            Resolved::object(Arc::clone(&unread)).ready()
        })
}

const EVERYTHING: &str = r#"
query Everything {
  appointments {
    edges {
      node {
        id
        subject
        when
        isNow
        __typename
      }
    }
  }
  tasks {
    edges {
      node {
        id
        title
        isComplete
        __typename
      }
    }
  }
  unreadCounts {
    edges {
      node {
        id
        name
        unreadCount
        __typename
      }
    }
  }
}
"#;

#[test]
fn everything_query_resolves() {
    let loads: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
    let service = service(TODAY_SCHEMA, today_root(&loads), None, None);

    let output = run(&service, EVERYTHING);

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "appointments": {
                "edges": [{
                    "node": {
                        "id": "appointment-1",
                        "subject": "Lunch?",
                        "when": "tomorrow",
                        "isNow": false,
                        "__typename": "Appointment",
                    },
                }],
            },
            "tasks": {
                "edges": [{
                    "node": {
                        "id": "task-1",
                        "title": "Don't forget",
                        "isComplete": true,
                        "__typename": "Task",
                    },
                }],
            },
            "unreadCounts": {
                "edges": [{
                    "node": {
                        "id": "folder-1",
                        "name": "\"Fake\" inbox",
                        "unreadCount": 3,
                        "__typename": "Folder",
                    },
                }],
            },
        }),
    );
}

#[test]
fn loaders_fire_exactly_once_per_request() {
    let loads: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
    let service = service(TODAY_SCHEMA, today_root(&loads), None, None);

    let _ = run(&service, EVERYTHING);

    for counter in loads.iter() {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn repeated_requests_are_idempotent() {
    let loads: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
    let service = service(TODAY_SCHEMA, today_root(&loads), None, None);

    let first = run(&service, EVERYTHING);
    let second = run(&service, EVERYTHING);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.data).unwrap(),
        serde_json::to_string(&second.data).unwrap(),
    );
}

#[test]
fn validation_rejects_unknown_selection() {
    let loads: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
    let service = service(TODAY_SCHEMA, today_root(&loads), None, None);

    let doc = crate::parser::parse_executable("{ appointments { edges { node { missing } } } }")
        .unwrap();
    let errors = service.validate(&doc);

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "Unknown field \"missing\" on type \"Appointment\"",
    );
}
