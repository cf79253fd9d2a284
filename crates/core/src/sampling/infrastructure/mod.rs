pub mod skin_mask;
pub mod skin_region_sampler;
