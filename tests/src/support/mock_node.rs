//! # Mock JSON-RPC Node
//!
//! Speaks enough of the Ethereum JSON-RPC API for the harness: accounts,
//! chain id, code, calls, gas estimation, node-managed transactions and
//! receipts. Each deployed address is backed by a [`DeedLedger`]; every
//! transaction is mined into its own block as soon as it arrives.

use ch_01_abi::decode::{address_from_word, word};
use ch_01_abi::deed::ADD_SOLUTION_SIGNATURE;
use ch_01_abi::encode::{address_word, u256_word};
use ch_01_abi::{encode_tokens, event_topic, keccak256, selector, Token, WORD};
use ch_03_contracts::{DeedLedger, DeedMetadata, Revert};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::{Address, ContractEvent, H256, U256};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Chain id reported by default (ganache's).
pub const MOCK_CHAIN_ID: u64 = 1337;

const SIGNATURES: [&str; 16] = [
    "isOwner()",
    "name()",
    "symbol()",
    "baseTokenURI()",
    "totalSupply()",
    "balanceOf(address)",
    "tokenURI(uint256)",
    "ownerOf(uint256)",
    "owner()",
    "paused()",
    "pause()",
    "unpause()",
    "mint(address,uint256)",
    "approve(address,uint256)",
    "transferFrom(address,address,uint256)",
    ADD_SOLUTION_SIGNATURE,
];

/// How the node reports a revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevertStyle {
    /// `"VM Exception while processing transaction: revert <reason>"`
    #[default]
    Ganache,
    /// Code 3, `"execution reverted: <reason>"`, `Error(string)` in `data`.
    Geth,
}

enum Outcome {
    Return(Vec<u8>),
    Emitted(Vec<ContractEvent>),
}

#[derive(Deserialize)]
struct CallObject {
    #[serde(default)]
    from: Option<Address>,
    to: Address,
    #[serde(default)]
    data: Option<String>,
}

struct Call {
    from: Address,
    to: Address,
    data: Vec<u8>,
}

struct NodeState {
    chain_id: u64,
    accounts: Vec<Address>,
    contracts: HashMap<Address, DeedLedger>,
    receipts: HashMap<H256, Value>,
    block: u64,
    revert_style: RevertStyle,
    methods: Vec<String>,
}

/// A JSON-RPC node on a random local port. Stops when dropped.
pub struct MockNode {
    addr: SocketAddr,
    state: Arc<Mutex<NodeState>>,
    server: JoinHandle<()>,
}

impl MockNode {
    /// Start a node whose `eth_accounts` returns `accounts`.
    pub async fn start(accounts: Vec<Address>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(NodeState {
            chain_id: MOCK_CHAIN_ID,
            accounts,
            contracts: HashMap::new(),
            receipts: HashMap::new(),
            block: 0,
            revert_style: RevertStyle::default(),
            methods: Vec::new(),
        }));

        let shared = Arc::clone(&state);
        let server = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, Arc::clone(&shared)));
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn set_revert_style(&self, style: RevertStyle) {
        self.state.lock().revert_style = style;
    }

    /// Deploy a deed contract owned by `owner` and return its address.
    pub fn deploy(&self, owner: Address, metadata: DeedMetadata) -> Address {
        let mut state = self.state.lock();
        let mut preimage = owner.as_bytes().to_vec();
        preimage.extend_from_slice(&(state.contracts.len() as u64).to_be_bytes());
        let address = Address::from_slice(&keccak256(&preimage).as_bytes()[12..]);

        state
            .contracts
            .insert(address, DeedLedger::new(owner, metadata));
        address
    }

    /// Current state of the contract at `address`.
    #[must_use]
    pub fn ledger(&self, address: &Address) -> Option<DeedLedger> {
        self.state.lock().contracts.get(address).cloned()
    }

    /// Every method called so far, in order.
    #[must_use]
    pub fn methods(&self) -> Vec<String> {
        self.state.lock().methods.clone()
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// HTTP
// =============================================================================

async fn serve(mut socket: TcpStream, state: Arc<Mutex<NodeState>>) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        while let Some((body, consumed)) = take_request(&buffer) {
            buffer.drain(..consumed);
            let response = respond(&state, &body);
            let reply = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                response.len(),
                response
            );
            if socket.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }

        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Split one complete request off the front of `buffer`: its body and the
/// number of bytes it occupied.
fn take_request(buffer: &[u8]) -> Option<(Vec<u8>, usize)> {
    let header_end = buffer.windows(4).position(|w| w == b"\r\n\r\n")? + 4;
    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
    let length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let end = header_end + length;
    (buffer.len() >= end).then(|| (buffer[header_end..end].to_vec(), end))
}

fn respond(state: &Mutex<NodeState>, body: &[u8]) -> String {
    let request: Value = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            return json!({
                "jsonrpc": "2.0",
                "id": 0,
                "error": { "code": -32700, "message": e.to_string() }
            })
            .to_string()
        }
    };

    let id = request.get("id").cloned().unwrap_or(json!(0));
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    let outcome = state.lock().handle(method, &params);
    let response = match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    };
    response.to_string()
}

// =============================================================================
// JSON-RPC
// =============================================================================

fn invalid_params(message: impl Into<String>) -> Value {
    json!({ "code": -32602, "message": message.into() })
}

fn param<T: DeserializeOwned>(params: &Value, index: usize) -> Result<T, Value> {
    let value = params
        .get(index)
        .cloned()
        .ok_or_else(|| invalid_params(format!("missing param {index}")))?;
    serde_json::from_value(value).map_err(|e| invalid_params(e.to_string()))
}

fn parse_call(params: &Value) -> Result<Call, Value> {
    let object: CallObject = param(params, 0)?;
    let data = object.data.unwrap_or_default();
    let data = hex::decode(data.trim_start_matches("0x")).map_err(|e| invalid_params(e.to_string()))?;
    Ok(Call {
        from: object.from.unwrap_or_default(),
        to: object.to,
        data,
    })
}

fn revert_error(style: RevertStyle, reason: &str) -> Value {
    match style {
        RevertStyle::Ganache => json!({
            "code": -32000,
            "message": format!("VM Exception while processing transaction: revert {reason}"),
        }),
        RevertStyle::Geth => {
            let mut data = selector("Error(string)").to_vec();
            data.extend(encode_tokens(&[Token::String(reason.to_string())]));
            json!({
                "code": 3,
                "message": format!("execution reverted: {reason}"),
                "data": format!("0x{}", hex::encode(data)),
            })
        }
    }
}

impl NodeState {
    fn handle(&mut self, method: &str, params: &Value) -> Result<Value, Value> {
        self.methods.push(method.to_string());

        match method {
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id))),
            "eth_accounts" => Ok(json!(self.accounts)),
            "eth_gasPrice" => Ok(json!("0x3b9aca00")),
            "eth_getCode" => {
                let address: Address = param(params, 0)?;
                let code = if self.contracts.contains_key(&address) {
                    "0x6080604052"
                } else {
                    "0x"
                };
                Ok(json!(code))
            }
            "eth_call" => {
                let call = parse_call(params)?;
                let (output, _) = self.execute(&call, false)?;
                Ok(json!(format!("0x{}", hex::encode(output))))
            }
            "eth_estimateGas" => {
                let call = parse_call(params)?;
                self.execute(&call, false)?;
                Ok(json!("0x30d40"))
            }
            "eth_sendTransaction" => {
                let call = parse_call(params)?;
                self.mine(&call)
            }
            "eth_getTransactionReceipt" => {
                let hash: H256 = param(params, 0)?;
                Ok(self.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            other => Err(json!({ "code": -32601, "message": format!("Method {other} not found") })),
        }
    }

    /// Run `call` against a copy of the contract; keep the copy if `commit`
    /// and the call succeeded.
    fn execute(&mut self, call: &Call, commit: bool) -> Result<(Vec<u8>, Vec<ContractEvent>), Value> {
        let mut working = self
            .contracts
            .get(&call.to)
            .cloned()
            .ok_or_else(|| json!({ "code": -32000, "message": "no contract at address" }))?;

        match run(&mut working, call.from, &call.data) {
            Ok(Outcome::Return(output)) => Ok((output, Vec::new())),
            Ok(Outcome::Emitted(events)) => {
                if commit {
                    self.contracts.insert(call.to, working);
                }
                Ok((Vec::new(), events))
            }
            Err(reason) => Err(revert_error(self.revert_style, &reason)),
        }
    }

    fn mine(&mut self, call: &Call) -> Result<Value, Value> {
        let (_, events) = self.execute(call, true)?;
        self.block += 1;

        let mut preimage = self.block.to_be_bytes().to_vec();
        preimage.extend_from_slice(call.from.as_bytes());
        preimage.extend_from_slice(&call.data);
        let hash = keccak256(&preimage);

        let logs: Vec<Value> = events.iter().map(|e| log_json(call.to, e)).collect();
        self.receipts.insert(
            hash,
            json!({
                "transactionHash": hash,
                "blockNumber": format!("0x{:x}", self.block),
                "status": "0x1",
                "gasUsed": "0x5208",
                "logs": logs,
            }),
        );
        Ok(json!(hash))
    }
}

// =============================================================================
// CONTRACT DISPATCH
// =============================================================================

fn arg_uint(args: &[u8], index: usize) -> Result<U256, String> {
    word(args, index)
        .map(U256::from_big_endian)
        .map_err(|e| e.to_string())
}

fn arg_address(args: &[u8], index: usize) -> Result<Address, String> {
    word(args, index)
        .and_then(address_from_word)
        .map_err(|e| e.to_string())
}

fn reason(revert: Revert) -> String {
    revert.0.to_string()
}

fn returns(token: Token) -> Outcome {
    Outcome::Return(encode_tokens(&[token]))
}

fn run(ledger: &mut DeedLedger, caller: Address, data: &[u8]) -> Result<Outcome, String> {
    if data.len() < 4 {
        return Err("missing selector".to_string());
    }
    let (head, args) = data.split_at(4);
    let signature = SIGNATURES
        .iter()
        .copied()
        .find(|s| selector(s)[..] == *head)
        .ok_or_else(|| format!("unknown selector 0x{}", hex::encode(head)))?;

    let outcome = match signature {
        "isOwner()" => returns(Token::Bool(caller == ledger.owner())),
        "name()" => returns(Token::String(ledger.metadata().name.clone())),
        "symbol()" => returns(Token::String(ledger.metadata().symbol.clone())),
        "baseTokenURI()" => returns(Token::String(ledger.metadata().base_token_uri.clone())),
        "totalSupply()" => returns(Token::Uint(ledger.total_supply())),
        "balanceOf(address)" => returns(Token::Uint(ledger.balance_of(&arg_address(args, 0)?))),
        "tokenURI(uint256)" => returns(Token::String(
            ledger.token_uri(arg_uint(args, 0)?).map_err(reason)?,
        )),
        "ownerOf(uint256)" => returns(Token::Address(
            ledger.owner_of(arg_uint(args, 0)?).map_err(reason)?,
        )),
        "owner()" => returns(Token::Address(ledger.owner())),
        "paused()" => returns(Token::Bool(ledger.paused())),
        "pause()" => Outcome::Emitted(ledger.pause(caller).map_err(reason)?),
        "unpause()" => Outcome::Emitted(ledger.unpause(caller).map_err(reason)?),
        "mint(address,uint256)" => Outcome::Emitted(
            ledger
                .mint(caller, arg_address(args, 0)?, arg_uint(args, 1)?)
                .map_err(reason)?,
        ),
        "approve(address,uint256)" => Outcome::Emitted(
            ledger
                .approve(caller, arg_address(args, 0)?, arg_uint(args, 1)?)
                .map_err(reason)?,
        ),
        "transferFrom(address,address,uint256)" => Outcome::Emitted(
            ledger
                .transfer_from(
                    caller,
                    arg_address(args, 0)?,
                    arg_address(args, 1)?,
                    arg_uint(args, 2)?,
                )
                .map_err(reason)?,
        ),
        ADD_SOLUTION_SIGNATURE => {
            // Words 0..20 are the proof points and the public input
            let proof = args
                .get(..20 * WORD)
                .ok_or_else(|| "short calldata".to_string())?;
            Outcome::Emitted(
                ledger
                    .add_solution(
                        caller,
                        keccak256(proof),
                        arg_address(args, 20)?,
                        arg_uint(args, 21)?,
                    )
                    .map_err(reason)?,
            )
        }
        other => return Err(format!("unsupported call {other}")),
    };
    Ok(outcome)
}

/// Encode `event` the way the contract's log would look.
fn log_json(contract: Address, event: &ContractEvent) -> Value {
    let topic = event_topic(event.kind().signature().unwrap_or_default());

    let (topics, data): (Vec<H256>, Vec<u8>) = match event {
        ContractEvent::Transfer { from, to, token_id } => (
            vec![
                topic,
                H256(address_word(from)),
                H256(address_word(to)),
                H256(u256_word(*token_id)),
            ],
            Vec::new(),
        ),
        ContractEvent::Approval {
            owner,
            approved,
            token_id,
        } => (
            vec![
                topic,
                H256(address_word(owner)),
                H256(address_word(approved)),
                H256(u256_word(*token_id)),
            ],
            Vec::new(),
        ),
        ContractEvent::Paused { account } | ContractEvent::Unpaused { account } => {
            (vec![topic], address_word(account).to_vec())
        }
        ContractEvent::SolutionAdded { index, solver } => {
            let mut data = u256_word(*index).to_vec();
            data.extend_from_slice(&address_word(solver));
            (vec![topic], data)
        }
    };

    json!({
        "address": contract,
        "topics": topics,
        "data": format!("0x{}", hex::encode(data)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ch_01_abi::{decode_log, DeedAbi, RawLog};

    #[test]
    fn test_take_request_waits_for_full_body() {
        let request = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        assert!(take_request(&request[..request.len() - 1]).is_none());

        let (body, consumed) = take_request(request).unwrap();
        assert_eq!(body, b"hello");
        assert_eq!(consumed, request.len());
    }

    #[test]
    fn test_logs_decode_back() {
        let contract = Address::repeat_byte(0x10);
        let event = ContractEvent::Transfer {
            from: Address::zero(),
            to: Address::repeat_byte(0xAA),
            token_id: U256::from(7),
        };

        let log = log_json(contract, &event);
        let raw = RawLog {
            address: contract,
            topics: serde_json::from_value(log["topics"].clone()).unwrap(),
            data: hex::decode(log["data"].as_str().unwrap().trim_start_matches("0x")).unwrap(),
        };
        assert_eq!(decode_log(&raw).unwrap(), Some(event));
    }

    #[test]
    fn test_dispatch_mint_and_query() {
        let owner = Address::repeat_byte(0xAA);
        let mut ledger = DeedLedger::new(
            owner,
            DeedMetadata {
                name: "MyToken".into(),
                symbol: "MTK".into(),
                base_token_uri: "https://example.com/".into(),
            },
        );

        let minted = run(&mut ledger, owner, &DeedAbi::mint(&owner, U256::from(3))).unwrap();
        assert!(matches!(minted, Outcome::Emitted(ref events) if events.len() == 1));

        let Ok(Outcome::Return(uri)) = run(&mut ledger, owner, &DeedAbi::token_uri(U256::from(3))) else {
            panic!("tokenURI should return");
        };
        assert_eq!(ch_01_abi::decode_string(&uri).unwrap(), "https://example.com/3");

        let denied = run(
            &mut ledger,
            Address::repeat_byte(0xBB),
            &DeedAbi::mint(&owner, U256::from(4)),
        );
        assert_eq!(denied.err().as_deref(), Some("Caller is not contract owner"));
    }
}
