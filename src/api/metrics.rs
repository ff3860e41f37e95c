// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use std::sync::atomic::{AtomicU64, Ordering};

/// Request counters for the backend, rendered in Prometheus text format.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    pub orders_sent: AtomicU64,
    pub orders_rejected: AtomicU64,
    pub uploads_stored: AtomicU64,
    pub uploads_rejected: AtomicU64,
    pub stats_served: AtomicU64,
}

impl ServerMetrics {
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render(&self) -> String {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        format!(
            concat!(
                "# TYPE whatsapp_orders_sent counter\nwhatsapp_orders_sent {}\n",
                "# TYPE whatsapp_orders_rejected counter\nwhatsapp_orders_rejected {}\n",
                "# TYPE image_uploads_stored counter\nimage_uploads_stored {}\n",
                "# TYPE image_uploads_rejected counter\nimage_uploads_rejected {}\n",
                "# TYPE explorer_stats_served counter\nexplorer_stats_served {}\n"
            ),
            load(&self.orders_sent),
            load(&self.orders_rejected),
            load(&self.uploads_stored),
            load(&self.uploads_rejected),
            load(&self.stats_served),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_counters() {
        let m = ServerMetrics::default();
        ServerMetrics::inc(&m.orders_sent);
        ServerMetrics::inc(&m.orders_sent);
        let body = m.render();
        assert!(body.contains("whatsapp_orders_sent 2\n"));
        assert!(body.contains("image_uploads_rejected 0\n"));
    }
}
