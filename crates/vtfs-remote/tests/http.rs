//! End-to-end: a remote store talking to a real vtfs server over HTTP.

use std::net::SocketAddr;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use vtfs_remote::{RemoteConfig, RemoteStore};
use vtfs_server::{ServerConfig, VtfsServer};
use vtfs_store::Backend;
use vtfs_types::{ErrorKind, FsError, NodeKind, ObjectId, TransportReason};

/// A server running on its own runtime thread, stopped on drop.
struct Peer {
    addr: SocketAddr,
    stop: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Peer {
    fn start(config: ServerConfig) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                VtfsServer::new(config)
                    .serve_on(listener, async {
                        let _ = stopped.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            addr,
            stop: Some(stop),
            thread: Some(thread),
        }
    }

    fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn client(config: &RemoteConfig) -> RemoteStore {
    let store = RemoteStore::connect(config).unwrap();
    store.initialize().unwrap();
    store
}

#[test]
fn full_session_over_http() {
    let peer = Peer::start(ServerConfig::default());
    let store = client(&RemoteConfig::new(peer.endpoint()));

    let root = store.get_root().unwrap();
    assert_eq!(root.id, ObjectId::ROOT);

    let docs = store.make_dir(ObjectId::ROOT, "docs", 0o040755).unwrap();
    let note = store.create_file(docs.id, "note one.txt", 0o100644).unwrap();
    store.write_file(note.id, 0, b"remote bytes").unwrap();
    assert_eq!(store.read_file(note.id, 7, 64).unwrap(), b"bytes");

    let alias = store.link(ObjectId::ROOT, "alias", note.id).unwrap();
    assert_eq!(alias.nlink, 2);

    let listing: Vec<_> = store
        .read_dir(ObjectId::ROOT)
        .unwrap()
        .into_iter()
        .map(|e| (e.name, e.kind))
        .collect();
    assert_eq!(
        listing,
        [
            (".".to_string(), NodeKind::Directory),
            ("..".to_string(), NodeKind::Directory),
            ("docs".to_string(), NodeKind::Directory),
            ("alias".to_string(), NodeKind::File),
        ]
    );

    assert_eq!(store.resolve("/docs/note one.txt").unwrap().id, note.id);
    assert_eq!(
        store.remove_dir(ObjectId::ROOT, "docs").unwrap_err().kind(),
        ErrorKind::NotEmpty
    );
    store.truncate(note.id, 6).unwrap();
    assert_eq!(store.read_file(alias.id, 0, 64).unwrap(), b"remote");
    store.shutdown();
}

#[test]
fn token_mismatch_is_a_transport_failure() {
    let config = ServerConfig {
        token: Some("devtoken".into()),
        ..ServerConfig::default()
    };
    let peer = Peer::start(config);

    let good = client(&RemoteConfig::new(peer.endpoint()).with_token("devtoken"));
    assert!(good.get_root().is_ok());

    let bad = client(&RemoteConfig::new(peer.endpoint()).with_token("nope"));
    let err = bad.get_root().unwrap_err();
    assert!(matches!(
        err,
        FsError::Transport { reason: TransportReason::Unauthorized, .. }
    ));
    assert!(!err.is_not_found());
}

#[test]
fn oversized_write_is_rejected_by_the_peer() {
    let config = ServerConfig {
        max_body_size: 1024,
        ..ServerConfig::default()
    };
    let peer = Peer::start(config);
    let store = client(&RemoteConfig::new(peer.endpoint()));
    let f = store.create_file(ObjectId::ROOT, "big", 0o100644).unwrap();

    let err = store.write_file(f.id, 0, &[1u8; 4096]).unwrap_err();
    assert!(matches!(
        err,
        FsError::Transport { reason: TransportReason::HttpStatus(413), .. }
    ));
    assert_eq!(store.lookup(ObjectId::ROOT, "big").unwrap().size, 0);
}

#[test]
fn unreachable_peer_is_a_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let store = client(&RemoteConfig::new(format!("http://{addr}")).with_timeout_ms(2000));
    let err = store.lookup(ObjectId::ROOT, "anything").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert!(!err.is_not_found());
}

#[test]
fn silent_peer_times_out() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and hold the connection without ever answering.
    let _holder = std::thread::spawn(move || {
        let conn = listener.accept();
        std::thread::sleep(Duration::from_secs(3));
        drop(conn);
    });

    let store = client(&RemoteConfig::new(format!("http://{addr}")).with_timeout_ms(200));
    let started = Instant::now();
    let err = store.get_root().unwrap_err();
    assert!(matches!(
        err,
        FsError::Transport { reason: TransportReason::Timeout, .. }
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
}
