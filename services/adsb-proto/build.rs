fn main() {
    let ingest = tonic_build::manual::Service::builder()
        .name("Ingest")
        .package("adsb")
        .method(
            tonic_build::manual::Method::builder()
                .name("handle_observation")
                .route_name("HandleObservation")
                .input_type("crate::Observation")
                .output_type("crate::IngestAck")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[ingest]);
}
