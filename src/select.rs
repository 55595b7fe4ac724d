//! Priority-aware selection of the next build request.

use crossbeam_channel::select;
use tracing::{debug, trace, warn};

use crate::worker::{BuildChannels, BuildRequest};

/// Pick the next unit of work, or `None` when the worker should stop.
///
/// Policy, in order:
/// 1. A fired cancel signal stops the worker immediately, regardless of
///    pending work in either queue.
/// 2. A request ready on the priority queue right now is taken without
///    waiting on the normal queue.
/// 3. Block until a request arrives on either queue or a termination signal
///    fires.
///
/// The explicit non-blocking check in step 2 is what preserves the priority
/// guarantee: the blocking `select!` in step 3 picks a ready arm at random,
/// so on simultaneous readiness it alone would let normal traffic starve the
/// priority queue. A disconnected request queue also stops the worker, since
/// its producer is gone for good.
pub(crate) fn select_next_request(channels: &BuildChannels) -> Option<BuildRequest> {
    if channels.cancel.is_fired() {
        warn!("Cancellation signal received");
        return None;
    }

    if let Ok(req) = channels.priority_requests.try_recv() {
        trace!("PRIORITY REQUEST for node {:?}", req.node);
        return Some(req);
    }

    select! {
        recv(channels.priority_requests) -> req => match req {
            Ok(req) => {
                trace!("PRIORITY REQUEST for node {:?}", req.node);
                Some(req)
            }
            Err(_) => None,
        },
        recv(channels.requests) -> req => match req {
            Ok(req) => {
                trace!("normal REQUEST for node {:?}", req.node);
                Some(req)
            }
            Err(_) => None,
        },
        recv(channels.cancel.receiver()) -> _ => {
            warn!("Cancellation signal received");
            None
        }
        recv(channels.done.receiver()) -> _ => {
            debug!("Worker finished signal received");
            None
        }
    }
}
