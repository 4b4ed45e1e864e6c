use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use criterion::{Criterion, criterion_group, criterion_main};
use dnscheck::dns::DNSPacket;
use dnscheck::dns::enums::DNSResourceType;
use dnscheck::dns::rdata::{DnskeyData, DsData};
use dnscheck::dnssec::compute_expected_ds;
use std::hint::black_box;

fn create_dnskey_response() -> Vec<u8> {
    let key = BASE64
        .decode("AQOeiiR0GOMYkDshWoSKz9XzfwJr1AYtsmx3TGkJaNXVbfi/2pHm822aJ5iI9BMzNXxeYCmZDRD99WYwYqUSdjMmmAphXdvxegXd/M5+X7OrzKBaMbCVdFLUUh6DhweJBjEVv5f2wwjM9XzcnOf+EPbtG9DMBmADjFDc2w/rljwvFw==")
        .unwrap();

    let mut packet = vec![
        0x12, 0x34, // ID
        0x81, 0x80, // Flags: standard response
        0x00, 0x01, // Questions: 1
        0x00, 0x02, // Answers: 2
        0x00, 0x00, // Authority: 0
        0x00, 0x01, // Additional: 1
    ];
    packet.extend_from_slice(&[0x07, b'e', b'x', b'a', b'm', b'p', b'l', b'e']);
    packet.extend_from_slice(&[0x03, b'c', b'o', b'm', 0x00]);
    packet.extend_from_slice(&[0x00, 0x30, 0x00, 0x01]); // DNSKEY, IN

    for flags in [257u16, 256] {
        packet.extend_from_slice(&[0xC0, 0x0C]); // Compression pointer
        packet.extend_from_slice(&[0x00, 0x30, 0x00, 0x01]);
        packet.extend_from_slice(&[0x00, 0x00, 0x0E, 0x10]); // TTL: 3600
        packet.extend_from_slice(&((key.len() + 4) as u16).to_be_bytes());
        packet.extend_from_slice(&flags.to_be_bytes());
        packet.extend_from_slice(&[0x03, 0x05]); // Protocol 3, RSASHA1
        packet.extend_from_slice(&key);
    }

    // EDNS OPT record with DO
    packet.extend_from_slice(&[0x00, 0x00, 0x29, 0x10, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00]);
    packet
}

fn bench_packet_parsing(c: &mut Criterion) {
    let response = create_dnskey_response();
    c.bench_function("parse dnskey response", |b| {
        b.iter(|| DNSPacket::parse(black_box(&response)).unwrap())
    });

    c.bench_function("serialize query with edns", |b| {
        b.iter(|| {
            let mut query = DNSPacket::query(1, black_box("example.com"), DNSResourceType::DS);
            query.add_edns(4096, true);
            query.serialize().unwrap()
        })
    });
}

fn bench_ds_computation(c: &mut Criterion) {
    let packet = DNSPacket::parse(&create_dnskey_response()).unwrap();
    let keys: Vec<DnskeyData> = packet
        .answers
        .iter()
        .filter_map(|record| match &record.parsed_rdata {
            dnscheck::dns::rdata::RData::DNSKEY(key) => Some(key.clone()),
            _ => None,
        })
        .collect();
    let published = vec![DsData {
        key_tag: 60485,
        algorithm: 5,
        digest_type: 2,
        digest: vec![0; 32],
    }];

    c.bench_function("compute expected ds", |b| {
        b.iter(|| compute_expected_ds(black_box("example.com"), &published, &keys))
    });
}

criterion_group!(benches, bench_packet_parsing, bench_ds_computation);
criterion_main!(benches);
