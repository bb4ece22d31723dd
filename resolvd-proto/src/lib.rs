pub mod buffer;
pub mod packet;

pub use buffer::{BytePacketBuffer, ProtoError};
pub use packet::header::{Header, ResponseCode};
pub use packet::question::Question;
pub use packet::record::{RData, ResourceRecord};
pub use packet::{DnsClass, DnsPacket, QueryType};

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn copy_to(source: &[u8], target: &mut [u8]) {
        target[..source.len()].copy_from_slice(source);
    }

    #[test]
    fn should_read_googlecom_query_packet() {
        let bytes: [u8; 28] = [
            0x94, 0x75, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06, b'g',
            b'o', b'o', b'g', b'l', b'e', 0x03, b'c', b'o', b'm', 0x00, 0x00, 0x01, 0x00, 0x01,
        ];
        let packet = DnsPacket::decode(&bytes).unwrap();
        assert_eq!(packet.header.id, 0x9475);
        assert!(packet.header.rd);
        assert!(!packet.header.tc);
        assert_eq!(packet.questions.len(), 1);
        assert_eq!(packet.questions[0].name, "google.com");
        assert_eq!(packet.questions[0].qtype, QueryType::A);
        assert!(packet.answers.is_empty());

        let mut buf = [0u8; 28];
        copy_to(&bytes, &mut buf);
        let reencoded = packet.encode().unwrap();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn should_read_response_with_answer() {
        let mut bytes = vec![
            0x04, 0xd2, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x06, b'g',
            b'o', b'o', b'g', b'l', b'e', 0x03, b'c', b'o', b'm', 0x00, 0x00, 0x01, 0x00, 0x01,
        ];
        // answer: pointer to offset 12, type A, class IN, ttl=300, rdlength 4, rdata
        bytes.extend_from_slice(&[0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01]);
        bytes.extend_from_slice(&300u32.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x04, 1, 2, 3, 4]);

        let packet = DnsPacket::decode(&bytes).unwrap();
        assert_eq!(packet.header.id, 1234);
        assert_eq!(packet.answers.len(), 1);
        assert_eq!(packet.answers[0].name, "google.com");
        assert_eq!(packet.answers[0].ttl, 300);
        assert_eq!(packet.answers[0].data, RData::A(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn twelve_zero_bytes_parse_to_empty_message() {
        let bytes = [0u8; 12];
        let packet = DnsPacket::decode(&bytes).unwrap();
        assert_eq!(packet.questions.len(), 0);
        assert_eq!(packet.answers.len(), 0);
        assert_eq!(packet.authorities.len(), 0);
        assert_eq!(packet.additionals.len(), 0);
    }

    #[test]
    fn self_referencing_pointer_is_malformed() {
        // a label at offset 12 that points at itself
        let mut bytes = vec![0u8; 12];
        bytes.extend_from_slice(&[0xC0, 0x0C]);
        let err = DnsPacket::decode(&bytes).unwrap_err();
        assert!(matches!(err, ProtoError::PointerOutOfOrder));
    }

    #[test]
    fn short_packet_is_malformed() {
        let bytes = [0u8; 4];
        let err = DnsPacket::decode(&bytes).unwrap_err();
        assert!(matches!(err, ProtoError::PacketTooShort));
    }
}
