pub mod shared {
    pub mod constants;
    pub mod estimator_config;
    pub mod face_region;
    pub mod frame;
    pub mod stats;
}

pub mod sampling {
    pub mod domain {
        pub mod color_sample;
        pub mod region_sampler;
    }
    pub mod infrastructure;
}

pub mod estimation {
    pub mod domain {
        pub mod adaptive_smoother;
        pub mod butterworth;
        pub mod frame_rate_tracker;
        pub mod heart_rate_estimator;
        pub mod kalman_filter;
        pub mod lighting_estimator;
        pub mod pos_projector;
        pub mod respiration_estimator;
        pub mod spectrum;
        pub mod spo2_estimator;
        pub mod temporal_buffer;
    }
}

pub mod detection {
    pub mod domain {
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_decoder;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod control_message;
    pub mod session_config;
    pub mod session_logger;
    pub mod vitals_result;
    pub mod vitals_service;
    pub mod vitals_session;
    pub mod infrastructure;
}
