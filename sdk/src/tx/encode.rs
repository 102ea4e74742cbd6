//! Pure payload routing: derives the wire receiver and the `@`-joined data
//! field from a transaction action. No network or signing side effects.

use crate::config::{MULTI_TOKEN_TRANSFER_TAG, UPGRADE_CONTRACT_TAG, VM_VERSION_TAG};
use crate::data::{top_encode_address, top_encode_str, top_encode_u64, top_encode_uint, Address};

use super::{TokenTransfer, TxAction};

/// Derive `(receiver, data)` for an action.
///
/// Token-carrying actions are rerouted to the sender (the token-transfer
/// protocol requires the self-transfer shape) with the true receiver hex
/// encoded inside the payload.
pub fn route(action: &TxAction, sender: &Address) -> (Address, Option<String>) {
    match action {
        TxAction::Transfer { receiver, esdts } => {
            if esdts.is_empty() {
                (*receiver, None)
            } else {
                let mut parts = vec![
                    MULTI_TOKEN_TRANSFER_TAG.to_owned(),
                    top_encode_address(receiver),
                ];
                push_token_parts(&mut parts, esdts);
                (*sender, Some(parts.join("@")))
            }
        }
        TxAction::Deploy {
            code,
            code_metadata,
            code_args,
        } => {
            let mut parts = vec![
                code.clone(),
                VM_VERSION_TAG.to_owned(),
                code_metadata.to_hex(),
            ];
            parts.extend_from_slice(code_args);
            (Address::ZERO, Some(parts.join("@")))
        }
        TxAction::Call {
            callee,
            func_name,
            func_args,
            esdts,
        } => {
            let mut parts = Vec::new();
            let receiver = if esdts.is_empty() {
                parts.push(func_name.clone());
                *callee
            } else {
                parts.push(MULTI_TOKEN_TRANSFER_TAG.to_owned());
                parts.push(top_encode_address(callee));
                push_token_parts(&mut parts, esdts);
                parts.push(top_encode_str(func_name));
                *sender
            };
            parts.extend_from_slice(func_args);
            (receiver, Some(parts.join("@")))
        }
        TxAction::Upgrade {
            callee,
            code,
            code_metadata,
            code_args,
        } => {
            let mut parts = vec![
                UPGRADE_CONTRACT_TAG.to_owned(),
                code.clone(),
                code_metadata.to_hex(),
            ];
            parts.extend_from_slice(code_args);
            (*callee, Some(parts.join("@")))
        }
        TxAction::Raw { receiver, data } => (*receiver, data.clone()),
    }
}

fn push_token_parts(parts: &mut Vec<String>, esdts: &[TokenTransfer]) {
    parts.push(top_encode_u64(esdts.len() as u64));
    for esdt in esdts {
        parts.push(top_encode_str(&esdt.id));
        parts.push(top_encode_u64(esdt.nonce));
        parts.push(top_encode_uint(&esdt.amount));
    }
}
