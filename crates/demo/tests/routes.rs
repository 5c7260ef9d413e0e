use std::sync::Arc;
use std::time::Duration;

use ebb_demo::routes::{DEFAULT_PAGE, Router};
use ebb_http::connection::HttpConnection;
use indoc::indoc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

async fn exchange(wire: &[u8]) -> String {
    let (client, server) = duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let router = Router::new().with_counter_delay(Duration::from_millis(1));
    let task = tokio::spawn(HttpConnection::new(server_read, server_write).process(Arc::new(router)));

    let (mut client_read, mut client_write) = tokio::io::split(client);
    client_write.write_all(wire).await.unwrap();
    client_write.shutdown().await.unwrap();

    let mut output = Vec::new();
    client_read.read_to_end(&mut output).await.unwrap();
    task.await.unwrap().unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn unknown_path_gets_default_page() {
    let output = exchange(b"GET /missing HTTP/1.1\r\nHost: x\r\n\r\n").await;

    let expected = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\n\r\n{DEFAULT_PAGE}",
        DEFAULT_PAGE.len()
    );
    assert_eq!(output, expected);
}

#[tokio::test]
async fn echo_streams_body_back_chunked() {
    let wire = indoc! {r##"
    POST /echo HTTP/1.1
    Transfer-Encoding: chunked

    5
    hello
    0

    "##}
    .replace('\n', "\r\n");

    let output = exchange(wire.as_bytes()).await;
    assert_eq!(output, "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n");
}

#[tokio::test]
async fn counter_emits_five_lines() {
    let output = exchange(b"GET /counter HTTP/1.1\r\n\r\n").await;
    assert_eq!(
        output,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\n\r\n\
         2\r\n1\n\r\n2\r\n2\n\r\n2\r\n3\n\r\n2\r\n4\n\r\n2\r\n5\n\r\n0\r\n\r\n"
    );
}
