//! End-to-end transaction lifecycle tests against an in-process mock
//! gateway: send → await → resolve for each transaction kind, plus the
//! failure classifications.

mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mvx_sdk::data::base64_decode;
use mvx_sdk::{
    Address, CallContractTx, ClientError, CodeMetadata, DeployContractTx, DummySigner, Gateway,
    GatewayConfig, GatewayError, InteractionKind, TokenTransfer, TransferTx, U256,
};
use serde_json::json;
use support::{MockGateway, TX_HASH};

const EXPLORER: &str = "https://explorer.example.com";

fn gateway(url: &str) -> Gateway {
    Gateway::with_config(
        url,
        GatewayConfig {
            explorer_url: EXPLORER.to_owned(),
            ..Default::default()
        },
    )
    .expect("gateway")
}

fn signer(byte: u8) -> Arc<DummySigner> {
    Arc::new(DummySigner::new(Address::from_bytes([byte; 32])))
}

fn transfer(receiver: Address, value: u64) -> TransferTx {
    TransferTx {
        nonce: 1,
        value: U256::from(value),
        receiver,
        sender: signer(1),
        gas_price: 1_000_000_000,
        gas_limit: 50_000,
        esdts: vec![],
        chain_id: "D".to_owned(),
    }
}

#[tokio::test]
async fn scenario_a_transfer_settles_after_pending_polls() -> Result<()> {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["pending", "pending", "success"]);
        state.set_snapshot(
            TX_HASH,
            json!({"status": "success", "gasUsed": 50000, "fee": "5000000000000"}),
        );
    }
    let gateway = gateway(&mock.url);
    let receiver = Address::from_bytes([2; 32]);

    let res = gateway.transfer(transfer(receiver, 100)).await?;

    assert_eq!(res.hash, TX_HASH);
    assert_eq!(res.gas_used, 50_000);
    assert_eq!(res.fee, U256::from(5_000_000_000_000u64));
    assert_eq!(
        res.explorer_url,
        format!("{}/transactions/{}", EXPLORER, TX_HASH)
    );

    // the submitted raw transaction carries the stringified value, bech32
    // addresses and the (empty) dummy signature
    let sent = mock.lock().sent[0].clone();
    assert_eq!(sent["value"], json!("100"));
    assert_eq!(sent["receiver"], json!(receiver.to_bech32()));
    assert_eq!(sent["sender"], json!(Address::from_bytes([1; 32]).to_bech32()));
    assert_eq!(sent["signature"], json!(""));
    assert_eq!(sent["chainID"], json!("D"));
    Ok(())
}

#[tokio::test]
async fn scenario_b_call_returns_write_log_data() -> Result<()> {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["success"]);
        state.set_snapshot(
            TX_HASH,
            json!({
                "status": "success",
                "gasUsed": 1_000_000,
                "fee": "0",
                "logs": {"events": [{
                    "identifier": "writeLog",
                    "data": "QDZmNmJAMDA0MQ==", // "@6f6b@0041"
                }]},
            }),
        );
    }
    let gateway = gateway(&mock.url);

    let res = gateway
        .call_contract(CallContractTx {
            nonce: 4,
            value: U256::zero(),
            callee: Address::from_bytes([3; 32]),
            sender: signer(1),
            gas_price: 1_000_000_000,
            gas_limit: 10_000_000,
            func_name: "getValue".to_owned(),
            func_args: vec![],
            esdts: vec![],
            chain_id: "D".to_owned(),
        })
        .await?;

    assert_eq!(res.return_data, vec!["0041".to_owned()]);

    // zero-argument call: the payload is exactly the function name
    let sent = mock.lock().sent[0].clone();
    let data = base64_decode(sent["data"].as_str().unwrap())?;
    assert_eq!(data, b"getValue");
    Ok(())
}

#[tokio::test]
async fn scenario_c_failed_status_is_a_status_error() {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["fail"]);
        state.set_snapshot(TX_HASH, json!({"status": "fail"}));
    }
    let gateway = gateway(&mock.url);

    let err = gateway
        .call_contract(CallContractTx {
            nonce: 4,
            value: U256::zero(),
            callee: Address::from_bytes([3; 32]),
            sender: signer(1),
            gas_price: 1_000_000_000,
            gas_limit: 10_000_000,
            func_name: "getValue".to_owned(),
            func_args: vec![],
            esdts: vec![],
            chain_id: "D".to_owned(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Interaction(err) => {
            assert_eq!(err.kind, InteractionKind::Transaction);
            assert_eq!(err.code, "errorStatus");
            assert_eq!(err.message, "fail");
            assert_eq!(err.result["status"], json!("fail"));
        }
        other => panic!("expected interaction error, got {other:?}"),
    }
}

#[tokio::test]
async fn scenario_d_deploy_surfaces_contract_address() -> Result<()> {
    let deployed = Address::from_bytes([7; 32]);
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["success"]);
        state.set_snapshot(
            TX_HASH,
            json!({
                "status": "success",
                "gasUsed": 20_000_000,
                "fee": "1",
                "logs": {"events": [{
                    "identifier": "SCDeploy",
                    "address": deployed.to_bech32(),
                }]},
            }),
        );
    }
    let gateway = gateway(&mock.url);

    let res = gateway
        .deploy_contract(DeployContractTx {
            nonce: 0,
            value: U256::zero(),
            sender: signer(1),
            gas_price: 1_000_000_000,
            gas_limit: 50_000_000,
            code: "0061736d".to_owned(),
            code_metadata: CodeMetadata::default(),
            code_args: vec![],
            chain_id: "D".to_owned(),
        })
        .await?;

    assert_eq!(res.address, deployed);
    assert!(res.return_data.is_empty());

    // deploys always target the zero address and join code, VM tag and metadata
    let sent = mock.lock().sent[0].clone();
    assert_eq!(sent["receiver"], json!(Address::ZERO.to_bech32()));
    let data = base64_decode(sent["data"].as_str().unwrap())?;
    assert_eq!(data, b"0061736d@0500@0500");
    Ok(())
}

#[tokio::test]
async fn deploy_without_sc_deploy_event_is_fatal() {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["success"]);
        state.set_snapshot(
            TX_HASH,
            json!({"status": "success", "gasUsed": 1, "fee": "0", "logs": {"events": []}}),
        );
    }
    let gateway = gateway(&mock.url);

    let err = gateway.resolve_deploy_contract(TX_HASH).await.unwrap_err();
    assert!(matches!(err, ClientError::MalformedTx { .. }));
}

#[tokio::test]
async fn token_transfer_is_encoded_as_self_transfer() -> Result<()> {
    let mock = MockGateway::start().await;
    mock.lock().queue_statuses(TX_HASH, &["success"]);
    let gateway = gateway(&mock.url);
    let sender = Address::from_bytes([1; 32]);
    let receiver = Address::from_bytes([2; 32]);

    let mut tx = transfer(receiver, 0);
    tx.esdts = vec![TokenTransfer::fungible("TOK-123456", 100u64)];
    gateway.send_transfer(tx).await?;

    let sent = mock.lock().sent[0].clone();
    assert_eq!(sent["receiver"], json!(sender.to_bech32()));
    let data = String::from_utf8(base64_decode(sent["data"].as_str().unwrap())?)?;
    let expected = format!(
        "MultiESDTNFTTransfer@{}@01@{}@@64",
        receiver.to_hex(),
        hex::encode("TOK-123456"),
    );
    assert_eq!(data, expected);
    Ok(())
}

#[tokio::test]
async fn resolving_a_pending_transaction_is_an_error() {
    let mock = MockGateway::start().await;
    mock.lock().queue_statuses(TX_HASH, &["pending"]);
    let gateway = gateway(&mock.url);

    let err = gateway.resolve_tx(TX_HASH).await.unwrap_err();
    assert!(matches!(err, ClientError::StillPending { hash } if hash == TX_HASH));
}

#[tokio::test]
async fn await_tx_within_times_out_on_stuck_transactions() {
    let mock = MockGateway::start().await;
    mock.lock().queue_statuses(TX_HASH, &["pending"]);
    let gateway = gateway(&mock.url);

    let err = gateway
        .await_tx_within(TX_HASH, Duration::from_millis(1200))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }));
}

#[tokio::test]
async fn unsuccessful_envelope_fails_with_full_response() {
    let mock = MockGateway::start().await;
    mock.lock().send_envelope = Some(json!({
        "data": null,
        "error": "transaction generation failed",
        "code": "internal_issue",
    }));
    let gateway = gateway(&mock.url);

    let err = gateway
        .send_transfer(transfer(Address::from_bytes([2; 32]), 100))
        .await
        .unwrap_err();
    match err {
        ClientError::Gateway(GatewayError::Unsuccessful { response }) => {
            assert!(response.contains("internal_issue"));
            assert!(response.contains("transaction generation failed"));
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn signal_error_event_is_decoded() {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["success"]);
        state.set_snapshot(
            TX_HASH,
            json!({
                "status": "success",
                "gasUsed": 1,
                "fee": "0",
                "logs": {"events": [{
                    "identifier": "signalError",
                    "topics": ["", "b3V0IG9mIGZ1bmRz"], // "out of funds"
                }]},
            }),
        );
    }
    let gateway = gateway(&mock.url);

    let err = gateway.resolve_tx(TX_HASH).await.unwrap_err();
    match err {
        ClientError::Interaction(err) => {
            assert_eq!(err.code, "signalError");
            assert_eq!(err.message, "out of funds");
        }
        other => panic!("expected interaction error, got {other:?}"),
    }
}

#[tokio::test]
async fn execution_receipt_return_code_is_an_error() {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["success"]);
        state.set_snapshot(
            TX_HASH,
            json!({
                "status": "success",
                "executionReceipt": {"returnCode": "out of gas", "returnMessage": "gas limit reached"},
            }),
        );
    }
    let gateway = gateway(&mock.url);

    let err = gateway.resolve_tx(TX_HASH).await.unwrap_err();
    match err {
        ClientError::Interaction(err) => {
            assert_eq!(err.code, "out of gas");
            assert_eq!(err.message, "gas limit reached");
        }
        other => panic!("expected interaction error, got {other:?}"),
    }
}

#[tokio::test]
async fn resolving_twice_yields_identical_results() -> Result<()> {
    let mock = MockGateway::start().await;
    {
        let mut state = mock.lock();
        state.queue_statuses(TX_HASH, &["success"]);
        state.set_snapshot(
            TX_HASH,
            json!({"status": "success", "gasUsed": 42, "fee": "99"}),
        );
    }
    let gateway = gateway(&mock.url);

    let first = gateway.resolve_transfer(TX_HASH).await?;
    let second = gateway.resolve_transfer(TX_HASH).await?;
    assert_eq!(first, second);
    Ok(())
}
