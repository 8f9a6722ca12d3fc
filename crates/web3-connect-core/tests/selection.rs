mod common;

use web3_connect_core::{
    initialize_connector, Connector, InitializedConnector, PriorityConnector, SelectedConnector,
    StateUpdate, Web3Error,
};

use common::{MockConnector, ZERO};

fn connected() -> StateUpdate {
    StateUpdate::connected(1, Vec::<String>::new())
}

#[test]
fn selected_is_active_per_connector() {
    let (connector, hooks, _) = initialize_connector(MockConnector::new);
    let (connector2, hooks2, _) = initialize_connector(MockConnector::new);
    let selected = SelectedConnector::new(vec![
        (connector.clone(), hooks).into(),
        (connector2.clone(), hooks2).into(),
    ])
    .expect("selected");

    assert!(!selected.selected_is_active(&*connector).expect("connector"));
    assert!(!selected.selected_is_active(&*connector2).expect("connector2"));

    connector.update(connected()).expect("update");
    assert!(selected.selected_is_active(&*connector).expect("connector"));
    assert!(!selected.selected_is_active(&*connector2).expect("connector2"));

    connector.reset_state();
    connector2.update(connected()).expect("update");
    assert!(!selected.selected_is_active(&*connector).expect("connector"));
    assert!(selected.selected_is_active(&*connector2).expect("connector2"));
}

#[test]
fn selected_values_come_from_the_requested_store() {
    let (connector, hooks, store) = initialize_connector(MockConnector::new);
    let (connector2, hooks2, store2) = initialize_connector(MockConnector::new);
    let selected = SelectedConnector::new(vec![
        (connector.clone(), hooks, store.clone()).into(),
        (connector2.clone(), hooks2, store2.clone()).into(),
    ])
    .expect("selected");

    connector
        .update(StateUpdate::connected(1, [ZERO]))
        .expect("update");
    connector2.update(StateUpdate::chain(10)).expect("update");

    assert_eq!(selected.selected_chain_id(&*connector).expect("chain"), Some(1));
    assert_eq!(selected.selected_chain_id(&*connector2).expect("chain"), Some(10));
    assert_eq!(
        selected
            .selected_account(&*connector)
            .expect("account")
            .map(|a| a.to_string()),
        Some(ZERO.to_owned())
    );
    assert_eq!(selected.selected_accounts(&*connector2).expect("accounts"), None);
    assert!(!selected.selected_is_activating(&*connector).expect("activating"));
    assert_eq!(
        selected.selected_store(&*connector2).expect("store").id(),
        store2.id()
    );
    assert!(selected
        .selected_provider(&*connector, None)
        .expect("provider")
        .is_some());
    assert!(selected
        .selected_provider(&*connector2, None)
        .expect("provider")
        .is_none());
}

#[test]
fn unknown_connector_is_rejected() {
    let (connector, hooks, _) = initialize_connector(MockConnector::new);
    let (connector2, hooks2, _) = initialize_connector(MockConnector::new);
    let (stranger, _, _) = initialize_connector(MockConnector::new);
    let selected = SelectedConnector::new(vec![
        (connector, hooks).into(),
        (connector2, hooks2).into(),
    ])
    .expect("selected");

    let err = selected.selected_chain_id(&*stranger).expect_err("must fail");
    assert!(matches!(err, Web3Error::ConnectorNotFound(id) if id == stranger.id()));
}

#[test]
fn store_lookup_requires_stores() {
    let (connector, hooks, _) = initialize_connector(MockConnector::new);
    let (connector2, hooks2, _) = initialize_connector(MockConnector::new);
    let selected = SelectedConnector::new(vec![
        (connector.clone(), hooks).into(),
        (connector2, hooks2).into(),
    ])
    .expect("selected");
    let err = selected.selected_store(&*connector).expect_err("must fail");
    assert!(matches!(err, Web3Error::StoresNotPassed(_)));
}

#[test]
fn empty_connector_list_is_rejected() {
    assert!(matches!(
        SelectedConnector::new(Vec::<InitializedConnector>::new()),
        Err(Web3Error::NoConnectors)
    ));
}

#[test]
fn priority_falls_back_to_first_connector() {
    let (connector, hooks, _) = initialize_connector(|a| MockConnector::named(a, "first"));
    let (connector2, hooks2, _) = initialize_connector(|a| MockConnector::named(a, "second"));
    let priority = PriorityConnector::new(vec![
        (connector.clone(), hooks).into(),
        (connector2.clone(), hooks2).into(),
    ])
    .expect("priority");

    assert_eq!(priority.priority_connector().id(), connector.id());
    assert!(!priority.priority_is_active().expect("is active"));
}

#[test]
fn priority_returns_first_active_connector() {
    let (connector, hooks, _) = initialize_connector(MockConnector::new);
    let (connector2, hooks2, _) = initialize_connector(MockConnector::new);
    let priority = PriorityConnector::new(vec![
        (connector.clone(), hooks).into(),
        (connector2.clone(), hooks2).into(),
    ])
    .expect("priority");

    connector.update(connected()).expect("update");
    assert_eq!(priority.priority_connector().id(), connector.id());
    assert!(priority.priority_is_active().expect("is active"));

    connector2.update(connected()).expect("update");
    assert_eq!(priority.priority_connector().id(), connector.id());
}

#[test]
fn priority_migrates_with_activity() {
    let (connector, hooks, _) = initialize_connector(MockConnector::new);
    let (connector2, hooks2, _) = initialize_connector(MockConnector::new);
    let priority = PriorityConnector::new(vec![
        (connector.clone(), hooks).into(),
        (connector2.clone(), hooks2).into(),
    ])
    .expect("priority");

    connector2
        .update(StateUpdate::connected(10, [ZERO]))
        .expect("update");
    assert_eq!(priority.priority_connector().id(), connector2.id());
    assert!(priority.priority_is_active().expect("is active"));
    assert_eq!(priority.priority_chain_id().expect("chain"), Some(10));
    assert!(priority.priority_account().expect("account").is_some());

    connector2.reset_state();
    assert_eq!(priority.priority_connector().id(), connector.id());
    assert_eq!(priority.priority_chain_id().expect("chain"), None);
    assert!(priority.priority_provider(None).expect("provider").is_none());
}
