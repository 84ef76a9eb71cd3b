#![allow(dead_code)]

use std::sync::Arc;

use vtfs_protocol::RpcRequest;
use vtfs_remote::{RemoteStore, RpcTransport};
use vtfs_server::Dispatcher;
use vtfs_store::{Backend, LocalStoreConfig, LocalTreeStore};
use vtfs_types::FsResult;

/// Transport that hands each request straight to a server-side dispatcher.
///
/// The request still goes through its string form (escaped query plus
/// body) and the reply through its byte form, so everything except the
/// HTTP hop is exercised.
pub struct Loopback {
    dispatcher: Dispatcher,
}

impl Loopback {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            dispatcher: Dispatcher::new(backend),
        }
    }
}

impl RpcTransport for Loopback {
    fn call(&self, request: &RpcRequest) -> FsResult<Vec<u8>> {
        Ok(self.dispatcher.handle(
            request.op().as_str(),
            &request.query_string(),
            request.payload().to_vec(),
        ))
    }
}

pub fn local(config: LocalStoreConfig) -> Box<dyn Backend> {
    let store = LocalTreeStore::with_config(config);
    store.initialize().expect("initialize local store");
    Box::new(store)
}

pub fn remote(config: LocalStoreConfig) -> Box<dyn Backend> {
    let peer = LocalTreeStore::with_config(config);
    peer.initialize().expect("initialize peer store");
    let store = RemoteStore::new(Loopback::new(Arc::new(peer)));
    store.initialize().expect("initialize remote store");
    Box::new(store)
}

/// Both backends, labelled, over identically configured trees.
pub fn backends(config: LocalStoreConfig) -> Vec<(&'static str, Box<dyn Backend>)> {
    vec![("local", local(config.clone())), ("remote", remote(config))]
}
