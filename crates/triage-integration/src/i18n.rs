//! 界面文本本地化
//!
//! 只翻译固定的界面标签和风险等级；没有译文时原样返回。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use triage_core::{Result, TriageError};

/// 支持的界面语言
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
    Tamil,
    Kannada,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Telugu,
        Language::Tamil,
        Language::Kannada,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
            Language::Tamil => "Tamil",
            Language::Kannada => "Kannada",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TriageError::Validation(format!("不支持的语言: {}", s)))
    }
}

/// 翻译界面文本
///
/// 英语或没有对应译文时原样返回输入。
pub fn translate(text: &str, language: Language) -> &str {
    let entry: Option<[&'static str; 4]> = match text {
        "Age" => Some(["आयु", "వయస్సు", "வயது", "ವಯಸ್ಸು"]),
        "Gender" => Some(["लिंग", "లింగం", "பாலினம்", "ಲಿಂಗ"]),
        "Symptoms" => Some(["लक्षण", "లక్షణాలు", "அறிகுறிகள்", "ಲಕ್ಷಣಗಳು"]),
        "Blood Pressure" => Some(["रक्तचाप", "రక్తపోటు", "இரத்த அழுத்தம்", "ರಕ್ತದ ಒತ್ತಡ"]),
        "Heart Rate" => Some(["हृदय गति", "హృదయ స్పందన", "இதய துடிப்பு", "ಹೃದಯ ಬಡಿತ"]),
        "Temperature" => Some(["तापमान", "ఉష్ణోగ్రత", "வெப்பநிலை", "ತಾಪಮಾನ"]),
        "Pre-Existing Condition" => Some(["पूर्व रोग", "ముందస్తు వ్యాధి", "முன் நோய்", "ಹಿಂದಿನ ಕಾಯಿಲೆ"]),
        "Submit" => Some(["जमा करें", "సమర్పించండి", "சமர்ப்பிக்கவும்", "ಸಲ್ಲಿಸು"]),
        "Results" => Some(["परिणाम", "ఫలితాలు", "முடிவுகள்", "ಫಲಿತಾಂಶ"]),
        "Risk Level" => Some(["जोखिम स्तर", "ప్రమాద స్థాయి", "அபாய நிலை", "ಅಪಾಯ ಮಟ್ಟ"]),
        "Department" => Some(["विभाग", "విభాగం", "துறை", "ವಿಭಾಗ"]),
        "Priority" => Some(["प्राथमिकता", "ప్రాధాన్యత", "முன்னுரிமை", "ಪ್ರಾಥಮ್ಯ"]),
        "Estimated Wait Time" => Some([
            "अनुमानित प्रतीक्षा समय",
            "అంచనా వేచి సమయం",
            "மதிப்பிடப்பட்ட காத்திருப்பு நேரம்",
            "ಅಂದಾಜು ಕಾಯುವ ಸಮಯ",
        ]),
        "Model Explainability" => Some(["मॉडल व्याख्या", "మోడల్ వివరణ", "மாதிரி விளக்கம்", "ಮಾದರಿ ವಿವರಣೆ"]),
        "High" => Some(["उच्च", "అధిక", "உயர்", "ಹೆಚ್ಚು"]),
        "Medium" => Some(["मध्यम", "మధ్యస్థ", "நடுத்தரம்", "ಮಧ್ಯಮ"]),
        "Low" => Some(["कम", "తక్కువ", "குறைவு", "ಕಡಿಮೆ"]),
        _ => None,
    };

    let column = match language {
        Language::English => return text,
        Language::Hindi => 0,
        Language::Telugu => 1,
        Language::Tamil => 2,
        Language::Kannada => 3,
    };

    match entry {
        Some(translations) => translations[column],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_known_labels() {
        assert_eq!(translate("Age", Language::Hindi), "आयु");
        assert_eq!(translate("Risk Level", Language::Tamil), "அபாய நிலை");
        assert_eq!(translate("High", Language::Kannada), "ಹೆಚ್ಚು");
        assert_eq!(translate("Department", Language::Telugu), "విభాగం");
    }

    #[test]
    fn test_english_and_unknown_are_identity() {
        assert_eq!(translate("Age", Language::English), "Age");
        assert_eq!(translate("Hospital Load", Language::Hindi), "Hospital Load");
        assert_eq!(translate("", Language::Tamil), "");
    }

    #[test]
    fn test_parse_language() {
        assert_eq!("telugu".parse::<Language>().unwrap(), Language::Telugu);
        assert_eq!(" Hindi ".parse::<Language>().unwrap(), Language::Hindi);
        assert!("Klingon".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::English);
    }
}
