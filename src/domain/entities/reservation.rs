use serde::{Deserialize, Serialize};

/// 予約の作成要求。同期キュー経由で `POST /reservations` に送られる。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// 社員の身分証番号
    pub cc: String,
    pub menu_id: String,
    pub protein_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_dish_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drink_id: Option<String>,
}

impl ReservationRequest {
    pub const OPERATION_TYPE: &'static str = "reservation.create";

    pub fn validate(&self) -> Result<(), String> {
        if self.cc.trim().is_empty() {
            return Err("Reservation cc cannot be empty".to_string());
        }
        if self.menu_id.trim().is_empty() {
            return Err("Reservation menu id cannot be empty".to_string());
        }
        if self.protein_id.trim().is_empty() {
            return Err("Reservation protein id cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let request = ReservationRequest {
            cc: "1020".into(),
            menu_id: "m1".into(),
            protein_id: "p1".into(),
            side_dish_id: None,
            drink_id: Some("d1".into()),
        };
        assert!(request.validate().is_ok());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["menuId"], "m1");
        assert_eq!(json["drinkId"], "d1");
        assert!(json.get("sideDishId").is_none());
    }

    #[test]
    fn test_blank_cc_is_rejected() {
        let request = ReservationRequest {
            cc: "".into(),
            menu_id: "m1".into(),
            protein_id: "p1".into(),
            side_dish_id: None,
            drink_id: None,
        };
        assert!(request.validate().is_err());
    }
}
