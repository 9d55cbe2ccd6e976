use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;
use tracing::debug;

use crate::models::{InstallRequest, InstalledPlugin};
use crate::services::{InstallError, InstallService};
use crate::ui::OperationManager;

pub type InstallOutcome = Result<InstalledPlugin, InstallError>;

/// Owns the state of one install surface: the busy flag and the progress indicator
///
/// The installation runs on its own task and reports back through a single completion message.
pub struct InstallController {
    install_service: Arc<dyn InstallService>,
    operation_manager: Arc<OperationManager>,
    busy: Arc<AtomicBool>,
}

/// Releases the busy flag when the installation task ends, panics included
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl InstallController {
    pub fn new(
        install_service: Arc<dyn InstallService>,
        operation_manager: Arc<OperationManager>,
    ) -> Self {
        Self {
            install_service,
            operation_manager,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn operation_manager(&self) -> &OperationManager {
        &self.operation_manager
    }

    /// Starts an installation, rejecting the call while another one is still running
    pub fn start(
        &self,
        request: InstallRequest,
    ) -> Result<oneshot::Receiver<InstallOutcome>, InstallError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejected install request for {} branch, busy", request.branch);
            return Err(InstallError::Busy);
        }

        let guard = BusyGuard(self.busy.clone());
        let install_service = self.install_service.clone();
        let operation_manager = self.operation_manager.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let outcome = install_service.install(&request, operation_manager).await;
            drop(guard);
            if tx.send(outcome).is_err() {
                debug!("Install result dropped, nobody is waiting for it");
            }
        });

        Ok(rx)
    }
}
