//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use ledger_tx_core::msg::{
    AddChainAddressMsg, ChainAddress, CreateEscrowMsg, IssueTokenMsg, NewTokenMsg,
    ReleaseEscrowMsg, RemoveChainAddressMsg, ReturnEscrowMsg, SendMsg, SetNameMsg, TokenDetails,
    UpdateEscrowPartiesMsg,
};
use ledger_tx_core::{
    Address, Coin, Ed25519PublicKey, Ed25519Signature, FeeInfo, Msg, StdSignature, Tx, TxBuilder,
    ADDRESS_LEN,
};

/// Generate a well-formed address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; ADDRESS_LEN]>().prop_map(Address::from)
}

/// Generate arbitrary bytes up to `max_len`.
pub fn blob(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(Bytes::from)
}

/// Generate a non-empty byte string up to `max_len`.
pub fn non_empty_blob(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 1..=max_len).prop_map(Bytes::from)
}

/// Generate a currency ticker.
pub fn ticker() -> impl Strategy<Value = String> {
    "[A-Z]{3,4}".prop_map(String::from)
}

/// Generate a valid, strictly positive coin.
pub fn positive_coin() -> impl Strategy<Value = Coin> {
    (0i64..1_000_000, 0i64..1_000_000_000, ticker())
        .prop_filter("must be positive", |(w, f, _)| *w > 0 || *f > 0)
        .prop_map(|(whole, fractional, ticker)| Coin::new(whole, fractional, ticker))
}

/// Generate any coin, including invalid ones. Encoding must not care.
pub fn any_coin() -> impl Strategy<Value = Coin> {
    (any::<i64>(), any::<i64>(), "[A-Za-z]{0,6}")
        .prop_map(|(whole, fractional, ticker)| Coin::new(whole, fractional, ticker))
}

/// Generate a valid identity token id.
pub fn username_id() -> impl Strategy<Value = Bytes> {
    "[a-zA-Z0-9+,._@-]{4,64}".prop_map(|s| Bytes::from(s.into_bytes()))
}

/// Generate an 8-byte escrow id.
pub fn escrow_id() -> impl Strategy<Value = Bytes> {
    any::<[u8; 8]>().prop_map(|b| Bytes::copy_from_slice(&b))
}

pub fn send_msg() -> impl Strategy<Value = SendMsg> {
    (address(), address(), positive_coin(), "[ -~]{0,128}", blob(64)).prop_map(
        |(src, dest, amount, memo, reference)| SendMsg {
            src,
            dest,
            amount,
            memo,
            reference,
        },
    )
}

pub fn set_name_msg() -> impl Strategy<Value = SetNameMsg> {
    (address(), "[a-z0-9_]{4,20}").prop_map(|(address, name)| SetNameMsg { address, name })
}

pub fn new_token_msg() -> impl Strategy<Value = NewTokenMsg> {
    (ticker(), "[A-Za-z0-9 _:-]{3,32}", 0u32..=9).prop_map(|(ticker, name, sig_figs)| {
        NewTokenMsg {
            ticker,
            name,
            sig_figs,
        }
    })
}

pub fn create_escrow_msg() -> impl Strategy<Value = CreateEscrowMsg> {
    (
        address(),
        non_empty_blob(40),
        non_empty_blob(40),
        prop::collection::vec(positive_coin(), 1..4),
        1u64..=u64::MAX,
        "[ -~]{0,128}",
    )
        .prop_map(
            |(src, arbiter, recipient, amount, timeout, memo)| CreateEscrowMsg {
                src,
                arbiter,
                recipient,
                amount,
                timeout,
                memo,
            },
        )
}

pub fn release_escrow_msg() -> impl Strategy<Value = ReleaseEscrowMsg> {
    (escrow_id(), prop::collection::vec(positive_coin(), 0..3))
        .prop_map(|(escrow_id, amount)| ReleaseEscrowMsg { escrow_id, amount })
}

pub fn return_escrow_msg() -> impl Strategy<Value = ReturnEscrowMsg> {
    escrow_id().prop_map(|escrow_id| ReturnEscrowMsg { escrow_id })
}

pub fn update_escrow_parties_msg() -> impl Strategy<Value = UpdateEscrowPartiesMsg> {
    (
        escrow_id(),
        prop::option::of(address()),
        prop::option::of(non_empty_blob(40)),
        prop::option::of(non_empty_blob(40)),
    )
        .prop_filter("at least one party", |(_, s, a, r)| {
            s.is_some() || a.is_some() || r.is_some()
        })
        .prop_map(|(escrow_id, sender, arbiter, recipient)| UpdateEscrowPartiesMsg {
            escrow_id,
            sender,
            arbiter,
            recipient,
        })
}

pub fn chain_address() -> impl Strategy<Value = ChainAddress> {
    (non_empty_blob(32), non_empty_blob(64))
        .prop_map(|(chain_id, address)| ChainAddress { chain_id, address })
}

pub fn issue_token_msg() -> impl Strategy<Value = IssueTokenMsg> {
    (
        address(),
        username_id(),
        prop::collection::vec(chain_address(), 0..3),
    )
        .prop_map(|(owner, id, addresses)| IssueTokenMsg {
            owner,
            id,
            details: TokenDetails { addresses },
        })
}

pub fn add_chain_address_msg() -> impl Strategy<Value = AddChainAddressMsg> {
    (username_id(), non_empty_blob(32), non_empty_blob(64)).prop_map(
        |(id, chain_id, address)| AddChainAddressMsg {
            id,
            chain_id,
            address,
        },
    )
}

pub fn remove_chain_address_msg() -> impl Strategy<Value = RemoveChainAddressMsg> {
    (username_id(), non_empty_blob(32), non_empty_blob(64)).prop_map(
        |(id, chain_id, address)| RemoveChainAddressMsg {
            id,
            chain_id,
            address,
        },
    )
}

/// Generate a valid message of any kind.
pub fn msg() -> impl Strategy<Value = Msg> {
    prop_oneof![
        send_msg().prop_map(Msg::from),
        set_name_msg().prop_map(Msg::from),
        new_token_msg().prop_map(Msg::from),
        create_escrow_msg().prop_map(Msg::from),
        release_escrow_msg().prop_map(Msg::from),
        return_escrow_msg().prop_map(Msg::from),
        update_escrow_parties_msg().prop_map(Msg::from),
        issue_token_msg().prop_map(Msg::from),
        add_chain_address_msg().prop_map(Msg::from),
        remove_chain_address_msg().prop_map(Msg::from),
    ]
}

/// Generate a fee descriptor.
pub fn fee_info() -> impl Strategy<Value = FeeInfo> {
    (prop::option::of(address()), positive_coin()).prop_map(|(payer, fees)| FeeInfo { payer, fees })
}

/// Generate a signature record. The bytes are random, not a real signature.
pub fn std_signature() -> impl Strategy<Value = StdSignature> {
    (
        any::<[u8; 32]>(),
        prop::collection::vec(any::<u8>(), 64),
        any::<u64>(),
    )
        .prop_map(|(pk, sig, sequence)| {
            let mut sig_bytes = [0u8; 64];
            sig_bytes.copy_from_slice(&sig);
            StdSignature {
                pubkey: Ed25519PublicKey::from_bytes(pk),
                signature: Ed25519Signature::from_bytes(sig_bytes),
                sequence,
            }
        })
}

/// Generate a list of signature records.
pub fn signatures(max: usize) -> impl Strategy<Value = Vec<StdSignature>> {
    prop::collection::vec(std_signature(), 0..=max)
}

/// Generate an unsigned transaction.
pub fn unsigned_tx() -> impl Strategy<Value = Tx> {
    (msg(), prop::option::of(fee_info()), prop::option::of(blob(32))).prop_map(
        |(msg, fees, preimage)| {
            let mut builder = TxBuilder::new(msg);
            if let Some(fees) = fees {
                builder = builder.fees(fees);
            }
            if let Some(preimage) = preimage {
                builder = builder.preimage(preimage);
            }
            builder.build()
        },
    )
}

/// Generate a transaction with up to four signature records attached.
pub fn tx() -> impl Strategy<Value = Tx> {
    (unsigned_tx(), signatures(4)).prop_map(|(mut tx, sigs)| {
        for sig in sigs {
            tx.add_signature(sig);
        }
        tx
    })
}
