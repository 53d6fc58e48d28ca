use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotel_booking_service::soap_client::{first_room_in_window, parse_available_rooms};
use hotel_booking_service::xml_document::decode_html_entities;

// Escaped availability response with `rooms` room entries
fn build_response(rooms: usize) -> String {
    let mut inner = String::from(
        "<soap:Envelope><soap:Body><tns:checkAvailabilityResponse><tns:availableRooms>",
    );
    for i in 0..rooms {
        // Only the last room falls inside the fixed window
        let day = if i + 1 == rooms { 21 } else { 1 + (i % 18) };
        inner.push_str(&format!(
            "<tns:room><tns:room_type>single</tns:room_type><tns:available_date>2024-11-{:02}</tns:available_date></tns:room>",
            day
        ));
    }
    inner.push_str("</tns:availableRooms></tns:checkAvailabilityResponse></soap:Body></soap:Envelope>");

    let escaped = inner
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("<x><tns:availableRooms>{}</tns:availableRooms></x>", escaped)
}

pub fn soap_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("soap_availability_response");

    for rooms in [10usize, 100, 1000].iter() {
        let response = build_response(*rooms);
        let start = "2024-11-20".parse().unwrap();
        let end = "2024-11-22".parse().unwrap();

        group.bench_with_input(BenchmarkId::new("parse", rooms), &response, |b, response| {
            b.iter(|| {
                let rooms = parse_available_rooms(black_box(response)).unwrap();
                black_box(first_room_in_window(&rooms, start, end).is_some())
            })
        });

        group.bench_with_input(BenchmarkId::new("decode", rooms), &response, |b, response| {
            b.iter(|| decode_html_entities(black_box(response)))
        });
    }

    group.finish();
}

criterion_group!(benches, soap_benchmark);
criterion_main!(benches);
