use chrono::{NaiveDate, TimeZone, Utc};
use fintrist_lib::{FintristError, IndexKind, Reader, Settings, SymbolLookup};
use tiingo_api::Client;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn client(server: &MockServer) -> Client {
    Client::with_base_url(&server.uri(), "test-key").unwrap()
}

fn fixture(name: &str) -> serde_json::Value {
    let raw = match name {
        "daily_batch" => include_str!("fixtures/daily_batch.json"),
        "iex_spy_session" => include_str!("fixtures/iex_spy_session.json"),
        "iex_batch" => include_str!("fixtures/iex_batch.json"),
        _ => unreachable!(),
    };
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn batch_request_when_undated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiingo/daily/prices"))
        .and(query_param("tickers", "AAPL,MSFT"))
        .and(header("Authorization", "Token test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("daily_batch")))
        .expect(1)
        .mount(&server)
        .await;

    let frame = Reader::daily(client(&server), vec!["aapl", "msft"])
        .without_date_filter()
        .read()
        .await
        .unwrap();

    assert!(frame.is_multi());
    assert_eq!(frame.kind(), IndexKind::Date);
    assert_eq!(frame.symbols(), vec!["AAPL", "MSFT"]);
    assert_eq!(frame.len(), 3);
    // Sorted ascending within each symbol.
    assert_eq!(frame.rows()[0].close, Some(214.24));

    let day = Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap();
    assert_eq!(frame.get("MSFT", day).and_then(|r| r.close), Some(442.57));
    assert_eq!(frame.xs("AAPL").unwrap().len(), 2);
}

#[tokio::test]
async fn batch_missing_symbol_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiingo/daily/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("daily_batch")))
        .mount(&server)
        .await;

    let err = Reader::daily(client(&server), vec!["AAPL", "GOOG"])
        .without_date_filter()
        .read()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FintristError::MissingSymbol { ref symbol, lookup: SymbolLookup::BatchResponse } if symbol == "GOOG"
    ));
    assert_eq!(err.to_string(), "batch response missing data for symbol 'GOOG'");
}

#[tokio::test]
async fn dated_request_goes_per_symbol() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiingo/daily/AAPL/prices"))
        .and(query_param("startDate", "2024-06-13"))
        .and(query_param("endDate", "2024-06-14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"date": "2024-06-14T00:00:00.000Z", "close": 212.49},
            {"date": "2024-06-13T00:00:00.000Z", "close": 214.24}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tiingo/daily/MSFT/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let frame = Reader::daily(client(&server), vec!["AAPL", "MSFT"])
        .with_start(day(2024, 6, 13))
        .with_end(day(2024, 6, 14))
        .read()
        .await
        .unwrap();

    assert_eq!(frame.symbols(), vec!["AAPL"]);
    assert_eq!(frame.column("close"), vec![Some(214.24), Some(212.49)]);
}

#[tokio::test]
async fn iex_reader_keeps_timestamps_and_dedups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iex/SPY/prices"))
        .and(query_param("resampleFreq", "5min"))
        .and(query_param("startDate", "2024-06-14"))
        .and(query_param("endDate", "2024-06-14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("iex_spy_session")))
        .mount(&server)
        .await;

    let frame = Reader::iex(client(&server), "SPY", "5min")
        .with_end(day(2024, 6, 14))
        .read()
        .await
        .unwrap();

    assert_eq!(frame.kind(), IndexKind::Timestamp);
    assert_eq!(frame.len(), 2);
    let last = &frame.rows()[1];
    assert_eq!(last.at, Utc.with_ymd_and_hms(2024, 6, 14, 13, 35, 0).unwrap());
    assert_eq!(last.close, Some(540.95));
}

#[tokio::test]
async fn http_error_propagates_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiingo/daily/NOPE/prices"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"Not found.\"}"))
        .mount(&server)
        .await;

    let err = Reader::daily(client(&server), "NOPE").read().await.unwrap_err();
    match err {
        FintristError::Api(inner) => {
            assert_eq!(inner.status(), Some(404));
            assert!(inner.body().unwrap_or_default().contains("Not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_symbol_rejected_before_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = Reader::daily(client(&server), "AA PL").read().await.unwrap_err();
    assert!(matches!(err, FintristError::InvalidInput(_)));
}

#[tokio::test]
async fn read_daily_uses_settings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiingo/daily/AAPL/prices"))
        .and(header("Authorization", "Token from-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"date": "2024-06-14T00:00:00.000Z", "close": 212.49}
        ])))
        .mount(&server)
        .await;

    let settings = Settings {
        tiingo_api_key: Some("from-settings".to_string()),
        tiingo_base_url: server.uri(),
        ..Settings::default()
    };
    let frame = fintrist_lib::read_daily(
        "AAPL",
        Some(day(2024, 6, 14)),
        Some(day(2024, 6, 14)),
        None,
        &settings,
    )
    .await
    .unwrap();
    assert!(frame.is_multi());
    assert_eq!(frame.len(), 1);
}

#[tokio::test]
async fn iex_batch_request_when_undated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iex/prices"))
        .and(query_param("tickers", "SPY,QQQ"))
        .and(query_param("resampleFreq", "5min"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("iex_batch")))
        .expect(1)
        .mount(&server)
        .await;

    let frame = Reader::iex(client(&server), vec!["SPY", "QQQ"], "5min")
        .without_date_filter()
        .read()
        .await
        .unwrap();

    assert!(frame.is_multi());
    assert_eq!(frame.kind(), IndexKind::Timestamp);
    assert_eq!(frame.symbols(), vec!["QQQ", "SPY"]);
    let spy = frame.xs("SPY").unwrap();
    assert_eq!(spy.len(), 2);
    assert_eq!(spy.rows()[0].at, Utc.with_ymd_and_hms(2024, 6, 14, 13, 30, 0).unwrap());
    assert_eq!(spy.column("close"), vec![Some(540.5), Some(540.9)]);
}

#[tokio::test]
async fn read_intraday_uses_settings_and_freq() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iex/SPY/prices"))
        .and(header("Authorization", "Token from-settings"))
        .and(query_param("resampleFreq", "1hour"))
        .and(query_param("startDate", "2024-06-14"))
        .and(query_param("endDate", "2024-06-14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("iex_spy_session")))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        tiingo_api_key: Some("from-settings".to_string()),
        tiingo_base_url: server.uri(),
        ..Settings::default()
    };
    let frame = fintrist_lib::read_intraday(
        "SPY",
        None,
        Some(day(2024, 6, 14)),
        "1hour",
        None,
        &settings,
    )
    .await
    .unwrap();
    assert!(frame.is_multi());
    assert_eq!(frame.kind(), IndexKind::Timestamp);
    assert_eq!(frame.len(), 2);
}
