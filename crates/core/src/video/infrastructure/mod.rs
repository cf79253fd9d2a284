pub mod image_frame_decoder;
