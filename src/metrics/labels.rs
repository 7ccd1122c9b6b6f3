//! Label types for Prometheus metrics

use prometheus_client::encoding::EncodeLabelSet;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DeviceLabels {
    pub device: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub device: String,
    pub outcome: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_labels_creation() {
        let labels = DeviceLabels {
            device: "192.0.2.1".to_string(),
        };

        assert_eq!(labels.device, "192.0.2.1");
    }

    #[test]
    fn test_request_labels_inequality() {
        let ok = RequestLabels {
            device: "192.0.2.1".to_string(),
            outcome: "success".to_string(),
        };
        let failed = RequestLabels {
            device: "192.0.2.1".to_string(),
            outcome: "auth_error".to_string(),
        };

        assert_ne!(ok, failed);
    }

    #[test]
    fn test_device_labels_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        let label = DeviceLabels {
            device: "192.0.2.1".to_string(),
        };
        set.insert(label.clone());
        set.insert(label.clone());

        assert_eq!(set.len(), 1);
        assert!(set.contains(&label));
    }
}
