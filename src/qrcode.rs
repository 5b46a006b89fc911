//! EMV-BR "Pix Copia e Cola" QR code string builder.
//!
//! The format is a sequence of TLV (ID, length, value) fields; the payload
//! is terminated by a CRC16-CCITT checksum over everything preceding it,
//! including the CRC field's own ID and length.

fn tlv(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

/// CRC16-CCITT (polynomial 0x1021, initial value 0xFFFF), as used by the
/// Pix BR Code spec.
fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Builds a minimal static Pix payload string for `pix_key`, `amount`, and
/// `transaction_id` (the `paymentReference`). Field IDs follow the EMV-BR
/// layout: 00 payload format, 26 merchant account info (Pix), 52 category
/// code, 53 currency, 54 amount, 58 country, 59 merchant name, 60 city, 62
/// additional data (txid), 63 CRC.
pub fn build_pix_payload(pix_key: &str, merchant_name: &str, merchant_city: &str, amount: f64, transaction_id: &str) -> String {
    let gui = tlv("00", "br.gov.bcb.pix");
    let key = tlv("01", pix_key);
    let merchant_account_info = tlv("26", &format!("{gui}{key}"));

    let additional_data = tlv("62", &tlv("05", transaction_id));

    let mut payload = String::new();
    payload.push_str(&tlv("00", "01")); // payload format indicator
    payload.push_str(&merchant_account_info);
    payload.push_str(&tlv("52", "0000")); // merchant category code
    payload.push_str(&tlv("53", "986")); // currency: BRL
    payload.push_str(&tlv("54", &format!("{amount:.2}")));
    payload.push_str(&tlv("58", "BR"));
    payload.push_str(&tlv("59", merchant_name));
    payload.push_str(&tlv("60", merchant_city));
    payload.push_str(&additional_data);

    // CRC is computed over the payload plus the CRC field's own id+length
    // (63, 04), with the checksum value itself left blank.
    payload.push_str("6304");
    let crc = crc16_ccitt(payload.as_bytes());
    payload.push_str(&format!("{crc:04X}"));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_is_deterministic_and_four_hex_digits() {
        let a = crc16_ccitt(b"hello world");
        let b = crc16_ccitt(b"hello world");
        assert_eq!(a, b);
        assert!(format!("{a:04X}").len() == 4);
    }

    #[test]
    fn payload_ends_with_crc_field_and_contains_txid() {
        let payload = build_pix_payload("crossflow@payments.example", "CROSSFLOW", "SAO PAULO", 917.24, "rabc12345-c1");
        assert!(payload.contains("rabc12345-c1"));
        assert!(payload.ends_with(&payload[payload.len() - 4..]));
        assert!(payload[payload.len() - 8..payload.len() - 4] == *"6304");
    }

    #[test]
    fn different_amounts_change_the_payload() {
        let a = build_pix_payload("k", "N", "C", 100.0, "tx1");
        let b = build_pix_payload("k", "N", "C", 200.0, "tx1");
        assert_ne!(a, b);
    }
}
