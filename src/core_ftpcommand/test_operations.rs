// Operation sequences exercised against the in-process fake server
