use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
struct AbortEntry {
    token: CancellationToken,
    aborted: bool,
}

static ABORT_REGISTRY: Lazy<Arc<Mutex<HashMap<String, AbortEntry>>>> =
    Lazy::new(|| Arc::new(Mutex::new(HashMap::new())));

pub fn register(request_id: &str, token: CancellationToken) {
    if request_id.is_empty() {
        return;
    }
    let mut map = ABORT_REGISTRY.lock();
    let entry = map.entry(request_id.to_string()).or_insert(AbortEntry {
        token: token.clone(),
        aborted: false,
    });
    entry.token = token;
}

pub fn abort(request_id: &str) -> bool {
    if request_id.is_empty() {
        return false;
    }
    let mut map = ABORT_REGISTRY.lock();
    if let Some(entry) = map.get_mut(request_id) {
        entry.aborted = true;
        entry.token.cancel();
        return true;
    }
    // An abort may arrive before the stream registers; remember it anyway.
    map.insert(
        request_id.to_string(),
        AbortEntry {
            token: CancellationToken::new(),
            aborted: true,
        },
    );
    true
}

pub fn is_aborted(request_id: &str) -> bool {
    if request_id.is_empty() {
        return false;
    }
    let map = ABORT_REGISTRY.lock();
    map.get(request_id).map(|e| e.aborted).unwrap_or(false)
}

pub fn clear(request_id: &str) {
    if request_id.is_empty() {
        return;
    }
    let mut map = ABORT_REGISTRY.lock();
    map.remove(request_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_cancels_registered_token() {
        let token = CancellationToken::new();
        register("req-1", token.clone());
        assert!(!is_aborted("req-1"));

        assert!(abort("req-1"));
        assert!(token.is_cancelled());
        assert!(is_aborted("req-1"));

        clear("req-1");
        assert!(!is_aborted("req-1"));
    }

    #[test]
    fn abort_before_register_is_remembered() {
        assert!(abort("req-2"));
        assert!(is_aborted("req-2"));
        clear("req-2");
    }

    #[test]
    fn empty_request_id_is_ignored() {
        assert!(!abort(""));
        assert!(!is_aborted(""));
    }
}
