//! Context lineage: shadowing, defaults and the shared channel cache

mod common;

use std::time::Duration;

use gossamer_client::context::{DEFAULT_FEE_LIMIT, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY};
use gossamer_client::executor::{self, execute};
use gossamer_client::transactions::retry_on_busy;
use gossamer_client::{Context, Field, Value};
use gossamer_core::{Address, Gateway, ResponseCode};
use gossamer_network::{AccountId, Query, QueryData, Response};

use common::*;

fn balance_query() -> Query {
    Query {
        header: Default::default(),
        data: QueryData::CryptoGetAccountBalance {
            account_id: AccountId::default(),
        },
    }
}

#[test]
fn test_child_shadows_parent_without_touching_it() {
    let (root, _) = scripted_context(ScriptedGateway::new());
    root.set_fee_limit(500);

    let child = root.child_with(|c| c.set_fee_limit(900));
    let grandchild = child.child();

    assert_eq!(root.fee_limit(), 500);
    assert_eq!(child.fee_limit(), 900);
    assert_eq!(grandchild.fee_limit(), 900);
    assert_eq!(grandchild.payer(), Some(Address::account(2)));

    child.reset(Field::FeeLimit);
    assert_eq!(grandchild.fee_limit(), 500);
}

#[test]
fn test_unset_fields_fall_back_to_defaults() {
    let context = Context::new(SharedConnector::new(ScriptedGateway::new()));
    let child = context.child();

    assert_eq!(child.fee_limit(), DEFAULT_FEE_LIMIT);
    assert_eq!(child.retry_count(), DEFAULT_RETRY_COUNT);
    assert_eq!(child.retry_delay(), DEFAULT_RETRY_DELAY);
    assert!(!child.adjust_for_clock_drift());
    assert!(child.gateway().is_none());
    assert!(child.transaction().is_none());
}

#[test]
fn test_set_by_name() {
    let (root, _) = scripted_context(ScriptedGateway::new());
    let child = root.child();

    child.set("retry-delay", Value::Duration(Duration::from_millis(5))).unwrap();
    assert_eq!(child.retry_delay(), Duration::from_millis(5));
    assert!(child.is_overridden(Field::RetryDelay));
    assert!(!child.is_overridden(Field::Payer));

    assert!(child.set("favourite_colour", Value::Flag(true)).is_err());
    assert!(child.set("payer", Value::Count(3)).is_err());
    assert_eq!(child.payer(), Some(Address::account(2)));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_children_share_one_channel() {
    let gateway = ScriptedGateway::new();
    gateway.script_queries([balance(1, 10, 0), balance(1, 10, 0)]);
    let (root, connector) = scripted_context(gateway.clone());
    let first = root.child();
    let second = root.child();

    let (a, b) = tokio::join!(
        execute(&first, balance_query(), executor::run_query, retry_on_busy::<Response>),
        execute(&second, balance_query(), executor::run_query, retry_on_busy::<Response>),
    );

    assert_eq!(a.unwrap().header.node_transaction_precheck_code, ResponseCode::Ok);
    assert_eq!(b.unwrap().header.node_transaction_precheck_code, ResponseCode::Ok);
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(root.open_channels(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_child_gateway_opens_its_own_channel() {
    let gateway = ScriptedGateway::new();
    gateway.script_queries([balance(1, 10, 0), balance(1, 10, 0)]);
    let (root, connector) = scripted_context(gateway);
    let elsewhere = root.child_with(|c| {
        c.set_gateway(Gateway::new("10.0.0.9:50211", Address::account(4)).unwrap())
    });

    execute(&root, balance_query(), executor::run_query, retry_on_busy::<Response>)
        .await
        .unwrap();
    execute(&elsewhere, balance_query(), executor::run_query, retry_on_busy::<Response>)
        .await
        .unwrap();

    assert_eq!(connector.connect_count(), 2);
    assert_eq!(elsewhere.open_channels(), 2);
}
