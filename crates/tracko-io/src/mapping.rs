//! 工作表欄位對應表
//!
//! 標題需先經過 [`normalize_header`](crate::sheet::normalize_header)。

/// 欄位對應結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column<F> {
    /// 對應到欄位
    Field(F),
    /// 已知但不匯入的欄位
    Ignored,
}

/// `SATIN ALMA`（採購）工作表欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    OrderDate,
    ContractNo,
    Supplier,
    Grade,
    HarvestYear,
    Packaging,
    FobPrice,
    CnfPrice,
    FreightPrice,
    TotalLb,
    TotalKg,
    ContainerType,
    FclCount,
    ContainerNo,
    AntrepoDeclarationNo,
    BlNo,
    BookingNo,
    AnRefNo,
    TruckNo,
    Etd,
    Eta,
}

impl OrderField {
    /// 依標題取得欄位；未知標題回傳 `None`
    pub fn from_header(header: &str) -> Option<Column<OrderField>> {
        let field = match header {
            "Sipariş Tarihi" => OrderField::OrderDate,
            "Contract" => OrderField::ContractNo,
            "Seller" => OrderField::Supplier,
            "Product" => OrderField::Grade,
            "Crop" => OrderField::HarvestYear,
            "Packaging" => OrderField::Packaging,
            "FOB Price" => OrderField::FobPrice,
            "CNF PRICE" => OrderField::CnfPrice,
            "Freight" => OrderField::FreightPrice,
            "Quantity LB" => OrderField::TotalLb,
            "Quantity KG" => OrderField::TotalKg,
            "TYPE" => OrderField::ContainerType,
            "FCL" => OrderField::FclCount,
            "Konteyner No" => OrderField::ContainerNo,
            "Antrepo Bey. No" => OrderField::AntrepoDeclarationNo,
            "B/L No" => OrderField::BlNo,
            "Booking No" => OrderField::BookingNo,
            "Ref. No." => OrderField::AnRefNo,
            "Tır No." => OrderField::TruckNo,
            "ETD" => OrderField::Etd,
            "ETA" => OrderField::Eta,
            "REF" | "Stok Kodu" | "Stok Adı" | "Shipper" | "Transit" | "Manuel Seçilecek"
            | "Freight Per LB" => return Some(Column::Ignored),
            _ => return None,
        };
        Some(Column::Field(field))
    }
}

/// `GİRİŞ ANALİZİ`（入庫分析）工作表欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisField {
    Grade,
    ContractNo,
    ContainerNo,
    TruckNo,
    BatchNo,
    Date,
    Analyst,
    Moisture,
    ForeignMatter,
    Caliber,
    HalvesRatio,
    BrokenRatio,
    TotalHB,
    SkinOn,
    Spotted,
    Immature,
    TipBroken,
    InsectBored,
    OffColor,
    SmallCaliber,
    LargeCaliber,
}

impl AnalysisField {
    /// 依標題取得欄位；未知標題回傳 `None`
    pub fn from_header(header: &str) -> Option<Column<AnalysisField>> {
        let field = match header {
            "Sınıf" => AnalysisField::Grade,
            "Kontrat No." => AnalysisField::ContractNo,
            "Konteyner No" => AnalysisField::ContainerNo,
            "Tır No" => AnalysisField::TruckNo,
            "Parti No" => AnalysisField::BatchNo,
            "Analiz Tarihi" => AnalysisField::Date,
            "Analiz Yapan" => AnalysisField::Analyst,
            "Nem" => AnalysisField::Moisture,
            "Yabancı Madde" => AnalysisField::ForeignMatter,
            "Kalibre" => AnalysisField::Caliber,
            "Şak" => AnalysisField::HalvesRatio,
            "Kırık" => AnalysisField::BrokenRatio,
            "Şak-Kırık" => AnalysisField::TotalHB,
            "Zarlı" => AnalysisField::SkinOn,
            "Lekeli" => AnalysisField::Spotted,
            "Urlu" => AnalysisField::Immature,
            "Ucu Kırık" => AnalysisField::TipBroken,
            "Böcek Yenikli" => AnalysisField::InsectBored,
            "Farklı Renk" => AnalysisField::OffColor,
            "Küçük Kal." => AnalysisField::SmallCaliber,
            "Büyük Kal." => AnalysisField::LargeCaliber,
            "Satın Alma Bağlantısı" => return Some(Column::Ignored),
            _ => return None,
        };
        Some(Column::Field(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::normalize_header;

    #[test]
    fn test_order_headers_after_normalization() {
        assert_eq!(
            OrderField::from_header(&normalize_header("FOB\r\nPrice")),
            Some(Column::Field(OrderField::FobPrice))
        );
        assert_eq!(
            OrderField::from_header(&normalize_header("Freight\r\nPer LB")),
            Some(Column::Ignored)
        );
        assert_eq!(OrderField::from_header("Unknown"), None);
    }

    #[test]
    fn test_analysis_headers() {
        assert_eq!(
            AnalysisField::from_header("Şak-Kırık"),
            Some(Column::Field(AnalysisField::TotalHB))
        );
        assert_eq!(
            AnalysisField::from_header("Satın Alma Bağlantısı"),
            Some(Column::Ignored)
        );
    }
}
