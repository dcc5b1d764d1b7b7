//! Shared test fixtures for the market-table integration tests.
//!
//! Provides record builders, a small sample batch, and `ScriptedSource`, a
//! fake `QuoteSource` that replays a queue of prepared fetch outcomes.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use market_table::{MarketTableError, QuoteSource, Record, Result};

/// Build a record with all numeric fields present.
pub fn record(id: &str, price: f64, change: f64) -> Record {
    Record {
        id: id.to_string(),
        name: Some(capitalize(id)),
        symbol: Some(id.chars().take(3).collect()),
        current_price: Some(price),
        price_change_percent_24h: Some(change),
        market_cap: Some(price * 1_000_000.0),
    }
}

/// Build a record with a chosen name and symbol.
pub fn named(id: &str, name: &str, symbol: &str, price: f64) -> Record {
    Record {
        id: id.to_string(),
        name: Some(name.to_string()),
        symbol: Some(symbol.to_string()),
        current_price: Some(price),
        price_change_percent_24h: Some(1.0),
        market_cap: Some(price * 1_000.0),
    }
}

/// `n` records `coin-00 .. coin-{n-1}` with prices `1.0 ..= n`.
pub fn numbered(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| record(&format!("coin-{i:02}"), (i + 1) as f64, i as f64 - 2.0))
        .collect()
}

/// Five well-formed quotes resembling the live endpoint's payload.
pub fn sample_batch() -> Vec<Record> {
    vec![
        Record {
            id: "bitcoin".into(),
            name: Some("Bitcoin".into()),
            symbol: Some("btc".into()),
            current_price: Some(67_123.45),
            price_change_percent_24h: Some(1.52),
            market_cap: Some(1_321_000_000_000.0),
        },
        Record {
            id: "ethereum".into(),
            name: Some("Ethereum".into()),
            symbol: Some("eth".into()),
            current_price: Some(3_456.7),
            price_change_percent_24h: Some(-0.83),
            market_cap: Some(415_000_000_000.0),
        },
        Record {
            id: "tether".into(),
            name: Some("Tether".into()),
            symbol: Some("usdt".into()),
            current_price: Some(1.0),
            price_change_percent_24h: Some(0.0),
            market_cap: Some(110_000_000_000.0),
        },
        Record {
            id: "solana".into(),
            name: Some("Solana".into()),
            symbol: Some("sol".into()),
            current_price: Some(145.2),
            price_change_percent_24h: Some(4.1),
            market_cap: Some(67_000_000_000.0),
        },
        Record {
            id: "dogecoin".into(),
            name: Some("Dogecoin".into()),
            symbol: Some("doge".into()),
            current_price: Some(0.1234),
            price_change_percent_24h: Some(0.01),
            market_cap: Some(17_800_000_000.0),
        },
    ]
}

/// The same batch as `sample_batch`, serialized the way the endpoint sends it.
pub fn sample_body() -> String {
    serde_json::json!([
        {
            "id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
            "image": "https://example.invalid/btc.png",
            "current_price": 67123.45, "market_cap": 1321000000000.0,
            "market_cap_rank": 1, "price_change_percentage_24h": 1.52
        },
        {
            "id": "ethereum", "symbol": "eth", "name": "Ethereum",
            "current_price": 3456.7, "market_cap": 415000000000.0,
            "market_cap_rank": 2, "price_change_percentage_24h": -0.83
        },
        {
            "id": "tether", "symbol": "usdt", "name": "Tether",
            "current_price": 1.0, "market_cap": 110000000000.0,
            "price_change_percentage_24h": 0.0
        },
        {
            "id": "solana", "symbol": "sol", "name": "Solana",
            "current_price": 145.2, "market_cap": 67000000000.0,
            "price_change_percentage_24h": 4.1
        },
        {
            "id": "dogecoin", "symbol": "doge", "name": "Dogecoin",
            "current_price": 0.1234, "market_cap": 17800000000.0,
            "price_change_percentage_24h": 0.01
        }
    ])
    .to_string()
}

pub fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

pub fn prices(records: &[Record]) -> Vec<f64> {
    records.iter().filter_map(|r| r.current_price).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// A `QuoteSource` that returns queued outcomes in order.
///
/// An exhausted queue behaves like a network failure.
#[derive(Default)]
pub struct ScriptedSource {
    outcomes: Mutex<VecDeque<std::result::Result<Vec<Record>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_batch(self, records: Vec<Record>) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(records));
        self
    }

    pub fn then_failure(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuoteSource for ScriptedSource {
    fn fetch(&self) -> Result<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(MarketTableError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            ))),
            None => Err(MarketTableError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "no scripted outcome left",
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Local HTTP stub
// ---------------------------------------------------------------------------

/// Serve a single HTTP response on a loopback port.
///
/// Returns the base URL to point a source at, and a handle yielding the
/// request line the stub received (e.g. `GET /coins/markets?... HTTP/1.1`).
pub fn serve_once(status: &str, body: &str) -> (String, std::thread::JoinHandle<String>) {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header == "\r\n" || header.is_empty() {
                break;
            }
        }
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request_line.trim_end().to_string()
    });

    (format!("http://{addr}"), handle)
}
