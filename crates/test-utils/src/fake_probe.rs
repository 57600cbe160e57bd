use std::sync::{Arc, Mutex};

use concur::reclaim::LivenessProbe;
use nix::unistd::Pid;

/// A fake liveness probe that:
/// - reports the process alive for the first `alive_for` probes
/// - records every pid it was asked about.
#[derive(Clone)]
pub struct ScriptedProbe {
    alive_for: usize,
    probed: Arc<Mutex<Vec<Pid>>>,
}

impl ScriptedProbe {
    pub fn new(alive_for: usize) -> Self {
        Self {
            alive_for,
            probed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn probed(&self) -> Vec<Pid> {
        self.probed.lock().unwrap().clone()
    }
}

impl LivenessProbe for ScriptedProbe {
    fn is_alive(&self, pid: Pid) -> bool {
        let mut probed = self.probed.lock().unwrap();
        probed.push(pid);
        probed.len() <= self.alive_for
    }
}
