//! Import artifacts into sqlite, then decode against what was stored

use std::fs;
use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use alloy_sol_types::{sol, SolEvent};

use logdecode::domain::abi::CandidateStore;
use logdecode::domain::NullSink;
use logdecode::infrastructure::AbiScanner;
use logdecode::store::SqliteCandidateStore;
use logdecode::{DecodeOutcome, LogDecoder, RawLog, TransactionContext};

sol! {
    event Deposit(address indexed dst, uint256 wad);
}

const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

const WETH_ARTIFACT: &str = r#"{
    "abi": [
        {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"withdraw","inputs":[{"name":"wad","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"event","name":"Deposit","anonymous":false,"inputs":[
            {"name":"dst","type":"address","indexed":true},
            {"name":"wad","type":"uint256","indexed":false}]}
    ],
    "bytecode": {"object": "0x"}
}"#;

#[tokio::test]
async fn test_import_then_decode() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("out").join("WETH9.sol").join("WETH9.json");
    fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    fs::write(&artifact, WETH_ARTIFACT).unwrap();

    let report = AbiScanner::scan(dir.path());
    assert_eq!(report.scanned_files, 1);
    assert_eq!(report.fragments.len(), 3);

    let store = SqliteCandidateStore::open(&dir.path().join("fragments.sqlite3")).unwrap();
    let written = store
        .record_all(
            report
                .fragments
                .iter()
                .map(|(fragment, path)| (fragment, path.display().to_string())),
        )
        .unwrap();
    assert_eq!(written, 3);

    let stats = store.stats().unwrap();
    assert_eq!(stats.fragments, 3);
    assert_eq!(stats.identifiers, 3);

    // importing the same artifact again changes nothing
    let again = AbiScanner::scan(dir.path());
    store
        .record_all(again.fragments.iter().map(|(f, _)| (f, "rescan")))
        .unwrap();
    assert_eq!(store.stats().unwrap().fragments, 3);

    let deposit_key: [u8; 4] = Deposit::SIGNATURE_HASH[..4].try_into().unwrap();
    let found = store.lookup_by_identifier(deposit_key, 3).await.unwrap();
    assert_eq!(found.len(), 1);

    let log = RawLog::new(
        WETH.to_string(),
        [
            Some(format!("0x{}", hex::encode(Deposit::SIGNATURE_HASH))),
            Some(format!("0x{}", hex::encode(WETH.into_word()))),
        ],
        U256::from(10u64).pow(U256::from(18u64)).to_be_bytes::<32>().to_vec(),
    );
    let decoder = LogDecoder::new(Arc::new(store), Arc::new(NullSink));
    let outcome = decoder
        .decode(&log, &TransactionContext::new(WETH.to_string()))
        .await;

    let DecodeOutcome::Unverified { candidates } = outcome else {
        panic!("expected unverified, got {outcome:?}");
    };
    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].signature_text,
        "Deposit(address indexed dst, uint256 wad)"
    );
    assert_eq!(candidates[0].mapping[1].value, "1000000000000000000");
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fragments.sqlite3");
    let artifact = dir.path().join("artifacts").join("WETH9.json");
    fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    fs::write(&artifact, WETH_ARTIFACT).unwrap();

    {
        let store = SqliteCandidateStore::open(&path).unwrap();
        let report = AbiScanner::scan(dir.path());
        store
            .record_all(report.fragments.iter().map(|(f, _)| (f, "first")))
            .unwrap();
    }

    let reopened = SqliteCandidateStore::open(&path).unwrap();
    // withdraw(uint256) = 0x2e1a7d4d
    let found = reopened
        .lookup_by_identifier([0x2e, 0x1a, 0x7d, 0x4d], 3)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].signature_key(), "withdraw(uint256)");
}
