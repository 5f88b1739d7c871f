use emissive_mask::{init_logger, run_variant, Variant};

#[tokio::main]
async fn main() {
    init_logger();
    run_variant(Variant::Mythic).await;
}
