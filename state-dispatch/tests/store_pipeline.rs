//! End-to-end tests for stores built through the facade crate

use std::sync::{Arc, Mutex};

use state_dispatch::debug::ActionLoggerMiddleware;
use state_dispatch::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
}

impl User {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[derive(Action, Clone, Debug)]
enum UserAction {
    SetUser(User),
    Clear,
    #[action(time_travel)]
    TimeTravel(TimeTravelAction<Option<User>>),
}

fn user_reducer(state: Option<User>, action: &UserAction) -> Option<User> {
    match action {
        UserAction::SetUser(user) => Some(user.clone()),
        UserAction::Clear => None,
        UserAction::TimeTravel(_) => state,
    }
}

#[test]
fn test_middleware_runs_in_insertion_order() {
    #[derive(Action, Clone, Debug)]
    enum Noop {
        Poke,
    }

    let store = Store::<i32, Noop>::builder(1)
        .middleware_fn(|state, action, chain| chain.next(state + 1, action))
        .middleware_fn(|state, action, chain| chain.next(state * 2, action))
        .reducer(|state, _| state);

    store.dispatch(Noop::Poke).unwrap();
    assert_eq!(store.state(), 4);
}

#[test]
fn test_subscriber_sees_every_change_until_unsubscribed() {
    let store = Store::new(None, user_reducer);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let handle = store.subscribe(move |state: &Option<User>| {
        log.lock().unwrap().push(state.clone());
    });

    store.dispatch(UserAction::SetUser(User::new("John"))).unwrap();
    store.dispatch(UserAction::Clear).unwrap();
    handle.unsubscribe();
    store.dispatch(UserAction::SetUser(User::new("Jane"))).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Some(User::new("John")), None]);
    assert_eq!(store.state(), Some(User::new("Jane")));
}

#[test]
fn test_value_watcher_reports_name_change_once() {
    let store = Store::new(Some(User::new("John")), user_reducer);
    let changes = Arc::new(Mutex::new(Vec::new()));
    let log = changes.clone();

    let _watcher = store.value_watcher(
        |state: &Option<User>| state.as_ref().map(|user| user.name.clone()),
        move |old: &Option<String>, new: &Option<String>| {
            log.lock().unwrap().push((old.clone(), new.clone()));
        },
    );

    store.dispatch(UserAction::SetUser(User::new("John Doe"))).unwrap();
    store.dispatch(UserAction::SetUser(User::new("John Doe"))).unwrap();

    assert_eq!(
        *changes.lock().unwrap(),
        vec![(Some("John".to_string()), Some("John Doe".to_string()))]
    );
}

#[test]
fn test_time_travel_through_store() {
    let time_travel = Arc::new(TimeTravelMiddleware::<Option<User>>::new(None));
    let store = Store::<Option<User>, UserAction>::builder(None)
        .shared_middleware(time_travel.clone())
        .reducer(user_reducer);

    store.dispatch(UserAction::SetUser(User::new("John"))).unwrap();
    store.dispatch(UserAction::Clear).unwrap();
    assert_eq!(store.state(), None);
    assert_eq!(
        time_travel.states(),
        vec![None, Some(User::new("John")), None]
    );

    store.dispatch(TimeTravelAction::travel_to(1).into()).unwrap();
    assert_eq!(store.state(), Some(User::new("John")));
    assert_eq!(time_travel.states().len(), 3);

    store.dispatch(TimeTravelAction::reset().into()).unwrap();
    assert_eq!(store.state(), None);
    assert_eq!(time_travel.current_state(), None);
}

#[test]
fn test_time_travel_rejects_bad_requests_without_touching_state() {
    let time_travel = Arc::new(TimeTravelMiddleware::<Option<User>>::new(None));
    let store = Store::<Option<User>, UserAction>::builder(None)
        .shared_middleware(time_travel.clone())
        .reducer(user_reducer);

    store.dispatch(UserAction::SetUser(User::new("John"))).unwrap();

    let err = store
        .dispatch(TimeTravelAction::Record(Some(User::new("Mallory"))).into())
        .unwrap_err();
    assert!(matches!(err, DispatchError::UsageViolation(_)));

    let err = store
        .dispatch(TimeTravelAction::travel_to(9).into())
        .unwrap_err();
    assert_eq!(err, DispatchError::IndexOutOfRange { index: 9, len: 2 });

    assert_eq!(store.state(), Some(User::new("John")));
    assert_eq!(time_travel.states().len(), 2);
}

#[test]
fn test_time_travel_history_is_bounded() {
    #[derive(Action, Clone, Debug)]
    enum CounterAction {
        Set(i32),
        #[action(time_travel)]
        TimeTravel(TimeTravelAction<i32>),
    }

    let config: TimeTravelConfig = serde_json::from_str(r#"{ "max_items": 5 }"#).unwrap();
    let time_travel = Arc::new(TimeTravelMiddleware::with_config(0, config));
    let store = Store::<i32, CounterAction>::builder(0)
        .shared_middleware(time_travel.clone())
        .reducer(|state, action: &CounterAction| match action {
            CounterAction::Set(value) => *value,
            CounterAction::TimeTravel(_) => state,
        });

    for value in 1..=6 {
        store.dispatch(CounterAction::Set(value)).unwrap();
    }

    assert_eq!(time_travel.states(), vec![2, 3, 4, 5, 6]);

    store.dispatch(TimeTravelAction::travel_to(0).into()).unwrap();
    assert_eq!(store.state(), 2);
}

#[derive(Debug, Clone, PartialEq)]
struct Todo {
    title: String,
    done: bool,
}

#[derive(Action, Clone, Debug)]
enum TodoAction {
    Add(String),
    Toggle(usize),
}

impl ActionSummary for TodoAction {}

fn todo_reducer(mut todos: Vec<Todo>, action: &TodoAction) -> Vec<Todo> {
    match action {
        TodoAction::Add(title) => todos.push(Todo {
            title: title.clone(),
            done: false,
        }),
        TodoAction::Toggle(index) => {
            if let Some(todo) = todos.get_mut(*index) {
                todo.done = !todo.done;
            }
        }
    }
    todos
}

#[test]
fn test_monitoring_middleware_sees_both_sides() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let before = trace.clone();
    let after = trace.clone();

    let store = Store::builder(Vec::new())
        .middleware(MonitoringMiddleware::new(
            move |todos: &Vec<Todo>, action: &TodoAction| {
                before
                    .lock()
                    .unwrap()
                    .push(format!("before {} ({})", action.name(), todos.len()));
            },
            move |todos: &Vec<Todo>, action: &TodoAction| {
                after
                    .lock()
                    .unwrap()
                    .push(format!("after {} ({})", action.name(), todos.len()));
            },
        ))
        .reducer(todo_reducer);

    store.dispatch(TodoAction::Add("write tests".into())).unwrap();
    store.dispatch(TodoAction::Toggle(0)).unwrap();

    assert_eq!(
        *trace.lock().unwrap(),
        vec![
            "before Add (0)",
            "after Add (1)",
            "before Toggle (1)",
            "after Toggle (1)",
        ]
    );
    assert!(store.state()[0].done);
}

#[test]
fn test_action_logger_records_state_changes() {
    let logger = Arc::new(ActionLoggerMiddleware::with_default_log());
    let store = Store::<Vec<Todo>, TodoAction>::builder(Vec::new())
        .shared_middleware(logger.clone())
        .reducer(todo_reducer);

    store.dispatch(TodoAction::Add("ship".into())).unwrap();
    store.dispatch(TodoAction::Toggle(7)).unwrap();

    let log = logger.log().unwrap();
    let entries: Vec<_> = log.entries().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Add");
    assert_eq!(entries[0].state_changed, Some(true));
    assert_eq!(entries[1].name, "Toggle");
    assert_eq!(entries[1].state_changed, Some(false));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatches_from_tasks() {
    #[derive(Action, Clone, Debug)]
    enum CounterAction {
        Increment,
    }

    let store = Arc::new(Store::new(0, |count: i32, _: &CounterAction| count + 1));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..5 {
                    store.dispatch(CounterAction::Increment).unwrap();
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.state(), 20);
}
