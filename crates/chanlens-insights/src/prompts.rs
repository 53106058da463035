//! Prompt text for the three insight requests.

use chanlens_core::ComparativeAnalysis;

pub(crate) const ANALYST_SYSTEM: &str = "You are an expert YouTube strategist analyzing competitive channel data. \
You provide specific, data-backed insights, never generic advice. \
Always reference actual channel names, video titles, and metrics from the data provided. \
Your recommendations are actionable and tailored to the specific channels being analyzed.";

pub(crate) const IDEAS_SYSTEM: &str = "You are an expert YouTube strategist creating data-backed video ideas. \
Each idea should capitalize on proven formats and topics from the competitive analysis. \
Ideas must be specific and actionable, not generic. \
Title variations should be distinct clickable titles, not minor word swaps. \
Hooks should be written as spoken word: the first 15 seconds of the video, \
as if the creator is speaking directly to camera.";

pub(crate) const TAKEAWAYS_SYSTEM: &str = "You are an expert YouTube strategist providing actionable recommendations. \
Each takeaway must be specific to the channels analyzed, never generic advice \
like 'post consistently' or 'engage with your audience'. \
Reference actual metrics and competitor performance.";

pub(crate) fn comparative(channel: &str, context: &str) -> String {
    format!(
        "Analyze this YouTube competitive landscape data for {channel}.\n\n\
{context}\n\n\
Return a JSON object with exactly this structure:\n\
{{\n\
  \"overview\": \"2-3 sentence summary of the competitive landscape, referencing specific channels and metrics\",\n\
  \"key_trends\": [\"Trend 1\", \"Trend 2\", \"Trend 3\"],\n\
  \"content_gaps\": [\"Gap 1: topics or formats competitors cover that {channel} doesn't, backed by data\", \"Gap 2\", \"Gap 3\"],\n\
  \"top_performer_note\": \"One short line with a key efficiency metric such as avg views per video, max 80 characters\"\n\
}}\n\n\
Return ONLY valid JSON, no other text."
    )
}

fn analysis_summary(analysis: &ComparativeAnalysis) -> String {
    let overview = if analysis.overview.is_empty() {
        "N/A"
    } else {
        analysis.overview.as_str()
    };
    format!(
        "Comparative Analysis Summary:\n- Overview: {overview}\n- Key Trends: {}\n- Content Gaps: {}",
        serde_json::to_string(&analysis.key_trends).unwrap_or_default(),
        serde_json::to_string(&analysis.content_gaps).unwrap_or_default(),
    )
}

pub(crate) fn video_ideas(
    channel: &str,
    context: &str,
    analysis: &ComparativeAnalysis,
    count: usize,
) -> String {
    let summary = analysis_summary(analysis);
    format!(
        "Based on this competitive analysis for {channel}, generate {count} video ideas.\n\n\
{context}\n\n\
{summary}\n\n\
Each idea should:\n\
1. Be inspired by specific outlier videos or content gaps in the data\n\
2. Be adapted for {channel}'s style and audience\n\
3. Have a compelling, clickable main title\n\
4. Include 5 distinct title variations (different angles, not minor rewording)\n\
5. Include 2 hooks, about 30 seconds of spoken word each\n\
6. Include a topic field citing the competitor videos and metrics the idea comes from, 1-2 sentences\n\n\
Return a JSON array of exactly {count} ideas:\n\
[\n\
  {{\n\
    \"title\": \"Main video title\",\n\
    \"title_variations\": [\"Alt 1\", \"Alt 2\", \"Alt 3\", \"Alt 4\", \"Alt 5\"],\n\
    \"hooks\": [\"Hook 1\", \"Hook 2\"],\n\
    \"topic\": \"Where this idea comes from\"\n\
  }}\n\
]\n\n\
Return ONLY valid JSON, no other text."
    )
}

pub(crate) fn takeaways(
    channel: &str,
    context: &str,
    analysis: &ComparativeAnalysis,
    count: usize,
) -> String {
    let summary = analysis_summary(analysis);
    format!(
        "Based on this competitive analysis for {channel}, provide {count} strategic takeaways.\n\n\
{context}\n\n\
{summary}\n\n\
Each takeaway should:\n\
1. Be specific and actionable for {channel}\n\
2. Reference actual competitor data and metrics\n\
3. Be 2-3 sentences max\n\
4. Focus on what to do differently, not just what was observed\n\n\
Return a JSON array of exactly {count} strings.\n\n\
Return ONLY valid JSON, no other text."
    )
}
